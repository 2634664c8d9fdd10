//! Process adapter configuration.

use std::path::PathBuf;

use serde::Deserialize;

use matterhub_domain::command::ClusterOptions;

use crate::error::ChipToolError;

/// Configuration of the `chip-tool` controller and the WiFi scanner.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChipToolConfig {
    /// Absolute path of the `chip-tool` executable.
    pub path: PathBuf,
    /// Endpoint and timing parameters for cluster commands.
    #[serde(flatten)]
    pub cluster: ClusterOptions,
    /// Pass `--bypass-attestation-verifier true` when pairing.
    pub bypass_attestation: bool,
    /// Program used to scan for WiFi networks.
    pub nmcli_path: PathBuf,
    /// Capacity of the per-invocation line channel.
    pub line_buffer: usize,
}

impl Default for ChipToolConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/home/ubuntu/apps/chip-tool"),
            cluster: ClusterOptions::default(),
            bypass_attestation: true,
            nmcli_path: PathBuf::from("nmcli"),
            line_buffer: 64,
        }
    }
}

impl ChipToolConfig {
    /// Check that the controller executable exists.
    ///
    /// # Errors
    ///
    /// Returns [`ChipToolError::NotFound`] when `path` does not exist.
    pub fn validate(&self) -> Result<(), ChipToolError> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(ChipToolError::NotFound(self.path.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matterhub_domain::id::Endpoint;

    #[test]
    fn should_have_sensible_defaults() {
        let config = ChipToolConfig::default();
        assert_eq!(config.path, PathBuf::from("/home/ubuntu/apps/chip-tool"));
        assert_eq!(config.cluster, ClusterOptions::default());
        assert!(config.bypass_attestation);
        assert_eq!(config.nmcli_path, PathBuf::from("nmcli"));
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            path = "/usr/local/bin/chip-tool"
            endpoint = 2
            transition_time = 10
            bypass_attestation = false
        "#;
        let config: ChipToolConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.path, PathBuf::from("/usr/local/bin/chip-tool"));
        assert_eq!(config.cluster.endpoint, Endpoint::new(2));
        assert_eq!(config.cluster.transition_time, 10);
        assert_eq!(config.cluster.options_mask, 0);
        assert!(!config.bypass_attestation);
    }

    #[test]
    fn should_reject_missing_executable() {
        let config = ChipToolConfig {
            path: PathBuf::from("/definitely/not/here/chip-tool"),
            ..ChipToolConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChipToolError::NotFound(_))));
    }

    #[test]
    fn should_accept_existing_executable() {
        let config = ChipToolConfig {
            path: PathBuf::from("/bin/sh"),
            ..ChipToolConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
