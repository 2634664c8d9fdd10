//! # matterhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `CommandRunner`: launch the control utility, stream its output
//!   - `LogSink`: append-only consumer of log/status lines
//!   - `NetworkScanner`: list WiFi networks visible to the host
//! - Own the in-memory **device registry** (`DeviceRegistry`)
//! - Provide the use-cases:
//!   - `CommandDispatcher`: power, brightness and colour intents
//!   - `PairingService`: commission a device and register it
//!   - `AutomationScheduler`: cyclic scene loop across all devices
//! - Provide **in-process infrastructure** (log bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `matterhub-domain` only (plus `tokio` primitives).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod log_bus;
pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
