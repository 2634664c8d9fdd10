//! Pairing: the provisioning handshake that joins a bulb to the network.
//!
//! A pairing attempt moves through [`PairingPhase`]s:
//!
//! ```text
//! Idle ─▶ PairingInProgress ─┬─▶ Paired ─▶ ProbingName ─▶ Registered
//!                            └─▶ PairFailed
//! ```
//!
//! `Registered` and `PairFailed` are resting states: like `Idle`, they accept
//! a new request and nothing else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MatterHubError, ValidationError};
use crate::id::NodeId;

/// Inputs entered by the user to commission a new device.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingRequest {
    /// Setup payload (`MT:…`) or manual pairing code.
    pub pairing_code: String,
    pub ssid: String,
    pub password: String,
}

impl PairingRequest {
    #[must_use]
    pub fn new(
        pairing_code: impl Into<String>,
        ssid: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            pairing_code: pairing_code.into(),
            ssid: ssid.into(),
            password: password.into(),
        }
    }

    /// Trim surrounding whitespace from the code and password.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            pairing_code: self.pairing_code.trim().to_string(),
            ssid: self.ssid,
            password: self.password.trim().to_string(),
        }
    }

    /// Check that both the pairing code and the WiFi password are present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPairingCode`] or
    /// [`ValidationError::EmptyPassword`].
    pub fn validate(&self) -> Result<(), MatterHubError> {
        if self.pairing_code.trim().is_empty() {
            return Err(ValidationError::EmptyPairingCode.into());
        }
        if self.password.trim().is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        Ok(())
    }
}

impl fmt::Debug for PairingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingRequest")
            .field("pairing_code", &self.pairing_code)
            .field("ssid", &self.ssid)
            .field("password", &"********")
            .finish()
    }
}

/// Where a pairing attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PairingPhase {
    Idle,
    PairingInProgress { node_id: NodeId },
    Paired { node_id: NodeId },
    PairFailed { node_id: NodeId },
    ProbingName { node_id: NodeId },
    Registered { node_id: NodeId, name: String },
}

impl PairingPhase {
    /// Whether a new pairing request may start from this phase.
    #[must_use]
    pub fn accepts_request(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::PairFailed { .. } | Self::Registered { .. }
        )
    }

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_advance_to(&self, next: &Self) -> bool {
        match (self, next) {
            (_, Self::PairingInProgress { .. }) => self.accepts_request(),
            (Self::PairingInProgress { node_id: a }, Self::Paired { node_id: b })
            | (Self::PairingInProgress { node_id: a }, Self::PairFailed { node_id: b })
            | (Self::Paired { node_id: a }, Self::ProbingName { node_id: b })
            | (Self::ProbingName { node_id: a }, Self::Registered { node_id: b, .. })
            | (Self::ProbingName { node_id: a }, Self::PairFailed { node_id: b }) => a == b,
            (Self::PairFailed { .. } | Self::Registered { .. }, Self::Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PairingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::PairingInProgress { node_id } => write!(f, "pairing node {node_id}"),
            Self::Paired { node_id } => write!(f, "node {node_id} paired"),
            Self::PairFailed { node_id } => write!(f, "pairing node {node_id} failed"),
            Self::ProbingName { node_id } => write!(f, "reading product name of node {node_id}"),
            Self::Registered { node_id, name } => write!(f, "{name} registered as node {node_id}"),
        }
    }
}
