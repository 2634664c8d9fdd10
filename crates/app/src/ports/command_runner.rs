//! Command runner port: launches the control utility as a child process.
//!
//! An invocation produces a [`CommandStream`]: zero or more
//! [`CommandEvent::Line`]s in the order the process wrote them, followed by
//! exactly one [`CommandEvent::Done`]. The process runs on its own task, so
//! the caller is never blocked while it executes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use matterhub_domain::command::CommandOutcome;
use matterhub_domain::error::MatterHubError;
use matterhub_domain::log::{LogLine, LogSource};

use crate::ports::LogSink;

/// One event emitted by a running invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
    /// A complete output line, newline stripped and sanitized.
    Line(String),
    /// The process ended; always the last event.
    Done(CommandOutcome),
}

/// Launches the external control utility.
pub trait CommandRunner: Send + Sync {
    /// Start the utility with `args` and return the stream of its output.
    ///
    /// Cancelling `cancel` kills the child, stops line delivery and yields
    /// [`CommandOutcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::Launch`] when the process cannot be started.
    /// No line is ever delivered in that case.
    fn execute(
        &self,
        args: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<CommandStream, MatterHubError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    fn execute(
        &self,
        args: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<CommandStream, MatterHubError> {
        (**self).execute(args, cancel)
    }
}

/// Receiving half of an invocation.
#[derive(Debug)]
pub struct CommandStream {
    events: mpsc::Receiver<CommandEvent>,
    finished: bool,
}

/// Everything an invocation printed, plus how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub lines: Vec<String>,
    pub outcome: CommandOutcome,
}

impl CapturedOutput {
    /// All lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl CommandStream {
    /// Wrap an existing receiver.
    #[must_use]
    pub fn new(events: mpsc::Receiver<CommandEvent>) -> Self {
        Self {
            events,
            finished: false,
        }
    }

    /// Create a bounded channel whose receiving half is a [`CommandStream`].
    ///
    /// Runner implementations keep the sender on the task driving the child.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<CommandEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once [`CommandEvent::Done`] has been yielded. A runner
    /// task that disappears without reporting completion is surfaced as
    /// [`CommandOutcome::Terminated`].
    pub async fn next_event(&mut self) -> Option<CommandEvent> {
        if self.finished {
            return None;
        }
        let event = self
            .events
            .recv()
            .await
            .unwrap_or(CommandEvent::Done(CommandOutcome::Terminated));
        if matches!(event, CommandEvent::Done(_)) {
            self.finished = true;
        }
        Some(event)
    }

    /// Forward every line to `sink` and return the final outcome.
    pub async fn drain_into<S: LogSink + ?Sized>(
        mut self,
        sink: &S,
        source: LogSource,
    ) -> CommandOutcome {
        while let Some(event) = self.next_event().await {
            match event {
                CommandEvent::Line(line) => sink.append(LogLine::new(source, line)),
                CommandEvent::Done(outcome) => return outcome,
            }
        }
        CommandOutcome::Terminated
    }

    /// Buffer the whole output in memory.
    pub async fn collect(mut self) -> CapturedOutput {
        let mut lines = Vec::new();
        while let Some(event) = self.next_event().await {
            match event {
                CommandEvent::Line(line) => lines.push(line),
                CommandEvent::Done(outcome) => return CapturedOutput { lines, outcome },
            }
        }
        CapturedOutput {
            lines,
            outcome: CommandOutcome::Terminated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;

    #[tokio::test]
    async fn should_yield_lines_then_done() {
        let (tx, mut stream) = CommandStream::channel(4);
        tx.send(CommandEvent::Line("a".into())).await.unwrap();
        tx.send(CommandEvent::Done(CommandOutcome::Exited(0)))
            .await
            .unwrap();

        assert_eq!(stream.next_event().await, Some(CommandEvent::Line("a".into())));
        assert_eq!(
            stream.next_event().await,
            Some(CommandEvent::Done(CommandOutcome::Exited(0)))
        );
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn should_report_terminated_when_sender_dropped_early() {
        let (tx, stream) = CommandStream::channel(4);
        tx.send(CommandEvent::Line("partial".into())).await.unwrap();
        drop(tx);

        let captured = stream.collect().await;
        assert_eq!(captured.lines, ["partial"]);
        assert_eq!(captured.outcome, CommandOutcome::Terminated);
    }

    #[tokio::test]
    async fn should_forward_lines_to_sink_in_order() {
        let (tx, stream) = CommandStream::channel(4);
        for line in ["one", "two", "three"] {
            tx.send(CommandEvent::Line(line.into())).await.unwrap();
        }
        tx.send(CommandEvent::Done(CommandOutcome::Exited(2)))
            .await
            .unwrap();

        let sink = RecordingSink::default();
        let outcome = stream.drain_into(&sink, LogSource::Command).await;

        assert_eq!(outcome, CommandOutcome::Exited(2));
        assert_eq!(sink.messages(), ["one", "two", "three"]);
    }

    #[test]
    fn should_join_captured_lines() {
        let captured = CapturedOutput {
            lines: vec!["a".into(), "b".into()],
            outcome: CommandOutcome::Exited(0),
        };
        assert_eq!(captured.text(), "a\nb");
    }
}
