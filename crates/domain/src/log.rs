//! Timestamps and the log line record surfaced to presentation layers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp used for log lines and pairing times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Which part of the orchestrator produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    /// Output streamed from a control-utility process.
    Command,
    Pairing,
    Automation,
    System,
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Command => "command",
            Self::Pairing => "pairing",
            Self::Automation => "automation",
            Self::System => "system",
        };
        f.write_str(label)
    }
}

/// A single line appended to the log/status sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: Timestamp,
    pub source: LogSource,
    pub message: String,
}

impl LogLine {
    /// Create a line stamped with the current time.
    #[must_use]
    pub fn new(source: LogSource, message: impl Into<String>) -> Self {
        Self {
            timestamp: now(),
            source,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.source,
            self.message
        )
    }
}
