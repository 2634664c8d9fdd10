//! # matterhub-adapter-chip-tool
//!
//! Process adapter: implements the command-runner and network-scanner ports
//! by spawning external programs.
//!
//! ## Responsibilities
//! - [`ChipToolRunner`]: launch `chip-tool` with an argument vector, merge
//!   stdout and stderr into one sanitized line stream, report how the process
//!   ended and kill it on cancellation
//! - [`NmcliScanner`]: list visible WiFi networks through `nmcli`
//!
//! ## Dependency rule
//! Depends on `matterhub-app` (for port traits) and `matterhub-domain`.

pub mod config;
pub mod error;
pub mod runner;
pub mod wifi;

pub use config::ChipToolConfig;
pub use error::ChipToolError;
pub use runner::ChipToolRunner;
pub use wifi::NmcliScanner;
