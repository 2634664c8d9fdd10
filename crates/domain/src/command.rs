//! Commands understood by the external control utility (`chip-tool`).
//!
//! The argument order and count of every subcommand is a contract with the
//! utility: a mismatch makes the device reject the command.
//!
//! | Command | Argument vector |
//! |---------|-----------------|
//! | [`Command::OnOff`] | `onoff {on\|off} <node> <endpoint>` |
//! | [`Command::MoveToLevel`] | `levelcontrol move-to-level <level> <transition> <mask> <override> <node> <endpoint>` |
//! | [`Command::MoveToHueAndSaturation`] | `colorcontrol move-to-hue-and-saturation <hue> <sat> <transition> <mask> <override> <node> <endpoint>` |
//! | [`Command::PairCodeWifi`] | `pairing code-wifi <node> <ssid> <password> <code> [--bypass-attestation-verifier true]` |
//! | [`Command::ReadProductName`] | `basicinformation read product-name <node> 0` |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::MAX_LEVEL;
use crate::id::{Endpoint, NodeId};

/// Clamp an arbitrary integer into the `0..=254` Matter level range.
#[must_use]
pub fn clamp_level(value: i64) -> u8 {
    u8::try_from(value.clamp(0, i64::from(MAX_LEVEL))).unwrap_or(MAX_LEVEL)
}

/// Fixed parameters shared by every cluster command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Endpoint hosting the lighting clusters.
    pub endpoint: Endpoint,
    /// Transition time in tenths of a second.
    pub transition_time: u16,
    pub options_mask: u8,
    pub options_override: u8,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::LIGHT,
            transition_time: 5,
            options_mask: 0,
            options_override: 0,
        }
    }
}

/// A single invocation of the control utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OnOff {
        node_id: NodeId,
        on: bool,
    },
    MoveToLevel {
        node_id: NodeId,
        level: u8,
    },
    MoveToHueAndSaturation {
        node_id: NodeId,
        hue: u8,
        saturation: u8,
    },
    PairCodeWifi {
        node_id: NodeId,
        ssid: String,
        password: String,
        pairing_code: String,
        bypass_attestation: bool,
    },
    ReadProductName {
        node_id: NodeId,
    },
}

impl Command {
    /// The node this command addresses.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::OnOff { node_id, .. }
            | Self::MoveToLevel { node_id, .. }
            | Self::MoveToHueAndSaturation { node_id, .. }
            | Self::PairCodeWifi { node_id, .. }
            | Self::ReadProductName { node_id } => *node_id,
        }
    }

    /// Build the argument vector passed after the utility path.
    #[must_use]
    pub fn args(&self, options: &ClusterOptions) -> Vec<String> {
        let tail = |node_id: NodeId| [node_id.to_string(), options.endpoint.to_string()];
        let timing = [
            options.transition_time.to_string(),
            options.options_mask.to_string(),
            options.options_override.to_string(),
        ];

        match self {
            Self::OnOff { node_id, on } => {
                let mut args = vec!["onoff".to_string(), on_off(*on).to_string()];
                args.extend(tail(*node_id));
                args
            }
            Self::MoveToLevel { node_id, level } => {
                let mut args = vec![
                    "levelcontrol".to_string(),
                    "move-to-level".to_string(),
                    level.to_string(),
                ];
                args.extend(timing);
                args.extend(tail(*node_id));
                args
            }
            Self::MoveToHueAndSaturation {
                node_id,
                hue,
                saturation,
            } => {
                let mut args = vec![
                    "colorcontrol".to_string(),
                    "move-to-hue-and-saturation".to_string(),
                    hue.to_string(),
                    saturation.to_string(),
                ];
                args.extend(timing);
                args.extend(tail(*node_id));
                args
            }
            Self::PairCodeWifi {
                node_id,
                ssid,
                password,
                pairing_code,
                bypass_attestation,
            } => {
                let mut args = vec![
                    "pairing".to_string(),
                    "code-wifi".to_string(),
                    node_id.to_string(),
                    ssid.clone(),
                    password.clone(),
                    pairing_code.clone(),
                ];
                if *bypass_attestation {
                    args.push("--bypass-attestation-verifier".to_string());
                    args.push("true".to_string());
                }
                args
            }
            Self::ReadProductName { node_id } => vec![
                "basicinformation".to_string(),
                "read".to_string(),
                "product-name".to_string(),
                node_id.to_string(),
                Endpoint::ROOT.to_string(),
            ],
        }
    }
}

/// Human-readable form with the WiFi password masked, suitable for logs.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnOff { node_id, on } => write!(f, "onoff {} {node_id}", on_off(*on)),
            Self::MoveToLevel { node_id, level } => {
                write!(f, "levelcontrol move-to-level {level} {node_id}")
            }
            Self::MoveToHueAndSaturation {
                node_id,
                hue,
                saturation,
            } => write!(
                f,
                "colorcontrol move-to-hue-and-saturation {hue} {saturation} {node_id}"
            ),
            Self::PairCodeWifi {
                node_id,
                ssid,
                pairing_code,
                ..
            } => write!(f, "pairing code-wifi {node_id} {ssid} ******** {pairing_code}"),
            Self::ReadProductName { node_id } => {
                write!(f, "basicinformation read product-name {node_id}")
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

/// How a control-utility process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The process exited with the given status code.
    Exited(i32),
    /// The process was killed by a signal and reported no status code.
    Terminated,
    /// The caller cancelled the invocation and the process was killed.
    Cancelled,
}

impl CommandOutcome {
    /// `true` only for a zero exit status.
    #[must_use]
    pub fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Terminated => f.write_str("was terminated by a signal"),
            Self::Cancelled => f.write_str("was cancelled"),
        }
    }
}
