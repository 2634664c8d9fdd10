//! Device record: one commissioned bulb known to the registry.

use serde::{Deserialize, Serialize};

use crate::color::RgbColor;
use crate::error::{MatterHubError, ValidationError};
use crate::id::NodeId;
use crate::log::{Timestamp, now};

/// A paired device.
///
/// `power_state`, `color` and `level` are *last commanded* values: they are
/// updated when a command is dispatched, not when the device confirms it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Display name and registry key.
    pub name: String,
    pub node_id: NodeId,
    /// WiFi network used while provisioning.
    pub network_ssid: String,
    pub power_state: bool,
    pub color: RgbColor,
    pub level: Option<u8>,
    pub paired_at: Timestamp,
}

impl DeviceRecord {
    /// Create a builder for constructing a [`DeviceRecord`].
    #[must_use]
    pub fn builder() -> DeviceRecordBuilder {
        DeviceRecordBuilder::default()
    }

    /// Name used when the device does not advertise a product name.
    #[must_use]
    pub fn default_name(node_id: NodeId) -> String {
        format!("Bulb {node_id}")
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), MatterHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`DeviceRecord`].
#[derive(Debug, Default)]
pub struct DeviceRecordBuilder {
    name: Option<String>,
    node_id: Option<NodeId>,
    network_ssid: Option<String>,
    power_state: bool,
    color: Option<RgbColor>,
    level: Option<u8>,
    paired_at: Option<Timestamp>,
}

impl DeviceRecordBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn node_id(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    #[must_use]
    pub fn network_ssid(mut self, ssid: impl Into<String>) -> Self {
        self.network_ssid = Some(ssid.into());
        self
    }

    #[must_use]
    pub fn power_state(mut self, on: bool) -> Self {
        self.power_state = on;
        self
    }

    #[must_use]
    pub fn color(mut self, color: RgbColor) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn paired_at(mut self, ts: Timestamp) -> Self {
        self.paired_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`DeviceRecord`].
    ///
    /// A missing node id falls back to [`NodeId::FIRST_DEVICE`] and a missing
    /// name to [`DeviceRecord::default_name`].
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::Validation`] if the name is blank.
    pub fn build(self) -> Result<DeviceRecord, MatterHubError> {
        let node_id = self.node_id.unwrap_or(NodeId::FIRST_DEVICE);
        let record = DeviceRecord {
            name: self
                .name
                .unwrap_or_else(|| DeviceRecord::default_name(node_id)),
            node_id,
            network_ssid: self.network_ssid.unwrap_or_default(),
            power_state: self.power_state,
            color: self.color.unwrap_or_default(),
            level: self.level,
            paired_at: self.paired_at.unwrap_or_else(now),
        };
        record.validate()?;
        Ok(record)
    }
}
