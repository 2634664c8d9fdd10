//! Log sink port: append-only destination for status and process output.

use std::sync::Arc;

use matterhub_domain::log::{LogLine, LogSource};

/// Receives every line surfaced to the operator.
///
/// Implementations must not block: they are called from runner drain tasks
/// and from the scheduler loop.
pub trait LogSink: Send + Sync {
    /// Append a fully formed line.
    fn append(&self, line: LogLine);

    /// Append a message stamped with the current time.
    fn emit(&self, source: LogSource, message: String) {
        self.append(LogLine::new(source, message));
    }
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn append(&self, line: LogLine) {
        (**self).append(line);
    }
}
