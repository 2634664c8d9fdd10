//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod command_runner;
pub mod log_sink;
pub mod network_scanner;

pub use command_runner::{CapturedOutput, CommandEvent, CommandRunner, CommandStream};
pub use log_sink::LogSink;
pub use network_scanner::NetworkScanner;
