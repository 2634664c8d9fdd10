//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MatterHubError`] via `#[from]` or an explicit `From` impl.

use crate::command::CommandOutcome;
use crate::id::NodeId;

/// Top-level error returned by application services and ports.
#[derive(Debug, thiserror::Error)]
pub enum MatterHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("registry conflict")]
    Conflict(#[from] ConflictError),

    /// The control utility could not be started (missing binary, permissions, …).
    #[error("failed to launch control utility")]
    Launch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("control utility command failed")]
    CommandFailed(#[from] CommandFailedError),
}

/// Input rejected before any process is launched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("pairing code must not be empty")]
    EmptyPairingCode,

    #[error("WiFi password must not be empty")]
    EmptyPassword,

    #[error("device name must not be empty")]
    EmptyName,

    #[error("another pairing is already in progress")]
    PairingInProgress,

    #[error("unknown scene `{0}`")]
    UnknownScene(String),

    #[error("invalid color `{0}`, expected #rrggbb")]
    InvalidColor(String),
}

/// A referenced device (or other named thing) does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Registry uniqueness invariant violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("a device named `{0}` is already registered")]
    DuplicateName(String),

    #[error("node id {0} is already in use")]
    DuplicateNodeId(NodeId),
}

/// The control utility ran but did not exit successfully.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{command}` {outcome}")]
pub struct CommandFailedError {
    /// Redacted, human-readable form of the command.
    pub command: String,
    pub outcome: CommandOutcome,
}
