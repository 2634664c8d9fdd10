//! Scripted port implementations shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use matterhub_domain::command::CommandOutcome;
use matterhub_domain::error::MatterHubError;
use matterhub_domain::log::LogLine;

use crate::ports::{CommandEvent, CommandRunner, CommandStream, LogSink};

/// What the next invocation of a [`ScriptedRunner`] does.
#[derive(Debug, Clone)]
pub enum Script {
    /// Print `lines` and exit with `code`.
    Exit { lines: Vec<String>, code: i32 },
    /// Fail to launch.
    LaunchError,
    /// Run until cancelled.
    Hang,
}

impl Script {
    pub fn ok(lines: &[&str]) -> Self {
        Self::Exit {
            lines: lines.iter().map(ToString::to_string).collect(),
            code: 0,
        }
    }

    pub fn exit(code: i32) -> Self {
        Self::Exit {
            lines: Vec::new(),
            code,
        }
    }
}

/// Runner that replays queued [`Script`]s and records every argument vector.
///
/// Once the queue is empty each invocation succeeds silently.
#[derive(Default)]
pub struct ScriptedRunner {
    scripts: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<Vec<String>>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl ScriptedRunner {
    pub fn with(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            ..Self::default()
        }
    }

    /// Cancellation tokens handed to each invocation, in call order.
    pub fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn execute(
        &self,
        args: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<CommandStream, MatterHubError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::exit(0));
        self.calls.lock().unwrap().push(args);
        self.tokens.lock().unwrap().push(cancel.clone());

        match script {
            Script::LaunchError => Err(MatterHubError::Launch(
                "No such file or directory (os error 2)".into(),
            )),
            Script::Exit { lines, code } => {
                let (tx, stream) = CommandStream::channel(lines.len() + 1);
                for line in lines {
                    tx.try_send(CommandEvent::Line(line)).unwrap();
                }
                tx.try_send(CommandEvent::Done(CommandOutcome::Exited(code)))
                    .unwrap();
                Ok(stream)
            }
            Script::Hang => {
                let (tx, stream) = CommandStream::channel(1);
                tokio::spawn(async move {
                    cancel.cancelled().await;
                    let _ = tx.send(CommandEvent::Done(CommandOutcome::Cancelled)).await;
                });
                Ok(stream)
            }
        }
    }
}

/// Sink that keeps every appended line in memory.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<LogLine>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.message.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl LogSink for RecordingSink {
    fn append(&self, line: LogLine) {
        self.lines.lock().unwrap().push(line);
    }
}
