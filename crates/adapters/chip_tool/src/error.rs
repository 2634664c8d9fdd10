//! Process adapter error types.

use std::path::PathBuf;

use matterhub_domain::error::MatterHubError;

/// Errors raised while starting or talking to a child process.
#[derive(Debug, thiserror::Error)]
pub enum ChipToolError {
    /// The program could not be spawned.
    #[error("failed to start `{}`", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The child was spawned without the requested pipe.
    #[error("child process has no {0} pipe")]
    MissingPipe(&'static str),

    /// The configured program path does not exist.
    #[error("`{}` does not exist", .0.display())]
    NotFound(PathBuf),
}

impl From<ChipToolError> for MatterHubError {
    fn from(err: ChipToolError) -> Self {
        MatterHubError::Launch(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_spawn_error_with_path() {
        let err = ChipToolError::Spawn {
            path: PathBuf::from("/opt/chip-tool"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "failed to start `/opt/chip-tool`");
    }

    #[test]
    fn should_convert_into_launch_error() {
        let err: MatterHubError = ChipToolError::MissingPipe("stdout").into();
        assert!(matches!(err, MatterHubError::Launch(_)));
    }
}
