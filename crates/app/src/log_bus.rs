//! In-process log bus backed by a tokio broadcast channel.
//!
//! Every line appended through [`LogSink`] is fanned out to live subscribers
//! (the daemon's file writer, tracing mirror, HTTP status) and kept in a
//! bounded history so late readers can still see recent output.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

use matterhub_domain::log::LogLine;

use crate::ports::LogSink;

/// Default capacity of the live channel. Large enough to absorb a burst of
/// controller output while a subscriber is writing to disk.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4096;

/// In-process log bus using a tokio [`broadcast`] channel.
///
/// Appending succeeds even when there are no active subscribers
/// (the line is then only kept in the history).
pub struct InProcessLogBus {
    sender: broadcast::Sender<LogLine>,
    history: Mutex<VecDeque<LogLine>>,
    history_limit: usize,
}

impl InProcessLogBus {
    /// Create a bus keeping the last `history` lines, with a live channel of
    /// [`DEFAULT_CHANNEL_CAPACITY`].
    #[must_use]
    pub fn new(history: usize) -> Self {
        Self::with_channel_capacity(history, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with independent history and live channel sizes.
    #[must_use]
    pub fn with_channel_capacity(history: usize, channel: usize) -> Self {
        let history = history.max(1);
        let (sender, _) = broadcast::channel(channel.max(1));
        Self {
            sender,
            history: Mutex::new(VecDeque::with_capacity(history)),
            history_limit: history,
        }
    }

    /// Subscribe to lines appended *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LogLine> {
        self.sender.subscribe()
    }

    /// The last `limit` lines, oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<LogLine> {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }
}

impl LogSink for InProcessLogBus {
    fn append(&self, line: LogLine) {
        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            if history.len() == self.history_limit {
                history.pop_front();
            }
            history.push_back(line.clone());
        }
        // Only fails when nobody is subscribed.
        let _ = self.sender.send(line);
    }
}
