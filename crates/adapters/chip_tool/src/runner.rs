//! `chip-tool` process runner.
//!
//! Every invocation spawns one child with piped stdout and stderr. A
//! dedicated task reads both pipes line by line, merges them into a single
//! stream, strips terminal escape sequences and forwards each line over the
//! invocation's channel. When both pipes are closed the task reaps the child
//! and sends the final [`CommandEvent::Done`].

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::SplitStream;
use tokio_util::sync::CancellationToken;

use matterhub_app::ports::{CommandEvent, CommandRunner, CommandStream};
use matterhub_domain::command::CommandOutcome;
use matterhub_domain::error::MatterHubError;
use matterhub_domain::output::sanitize;

use crate::config::ChipToolConfig;
use crate::error::ChipToolError;

/// [`CommandRunner`] backed by a real executable.
#[derive(Debug, Clone)]
pub struct ChipToolRunner {
    program: PathBuf,
    line_buffer: usize,
}

impl ChipToolRunner {
    /// Create a runner for the executable configured in `config`.
    #[must_use]
    pub fn new(config: &ChipToolConfig) -> Self {
        Self {
            program: config.path.clone(),
            line_buffer: config.line_buffer,
        }
    }

    #[must_use]
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn spawn(&self, args: &[String]) -> Result<Child, ChipToolError> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ChipToolError::Spawn {
                path: self.program.clone(),
                source,
            })
    }
}

impl CommandRunner for ChipToolRunner {
    fn execute(
        &self,
        args: Vec<String>,
        cancel: CancellationToken,
    ) -> Result<CommandStream, MatterHubError> {
        let mut child = self.spawn(&args)?;
        let stdout = child
            .stdout
            .take()
            .ok_or(ChipToolError::MissingPipe("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(ChipToolError::MissingPipe("stderr"))?;

        tracing::debug!(
            program = %self.program.display(),
            pid = child.id(),
            args = ?args,
            "spawned control utility"
        );

        let (tx, stream) = CommandStream::channel(self.line_buffer);
        tokio::spawn(drive(child, stdout, stderr, tx, cancel));
        Ok(stream)
    }
}

/// Forward the child's output, then report how it ended.
async fn drive<O, E>(
    mut child: Child,
    stdout: O,
    stderr: E,
    tx: mpsc::Sender<CommandEvent>,
    cancel: CancellationToken,
) where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = SplitStream::new(BufReader::new(stdout).split(b'\n'))
        .merge(SplitStream::new(BufReader::new(stderr).split(b'\n')));

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                kill(&mut child).await;
                let _ = tx.send(CommandEvent::Done(CommandOutcome::Cancelled)).await;
                return;
            }
            next = lines.next() => match next {
                Some(Ok(raw)) => {
                    // The receiver may be gone; keep draining so the child never
                    // blocks on a full pipe.
                    let _ = tx.send(CommandEvent::Line(decode_line(&raw))).await;
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "failed to read control utility output");
                    break;
                }
                None => break,
            },
        }
    }

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            kill(&mut child).await;
            CommandOutcome::Cancelled
        }
        status = child.wait() => match status {
            Ok(status) => status
                .code()
                .map_or(CommandOutcome::Terminated, CommandOutcome::Exited),
            Err(err) => {
                tracing::warn!(error = %err, "failed to reap control utility");
                CommandOutcome::Terminated
            }
        },
    };

    tracing::debug!(%outcome, "control utility finished");
    let _ = tx.send(CommandEvent::Done(outcome)).await;
}

async fn kill(child: &mut Child) {
    if let Err(err) = child.kill().await {
        tracing::warn!(error = %err, "failed to kill control utility");
    }
}

/// Lossy UTF-8 decode, trailing `\r` removed, escape sequences stripped.
fn decode_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let text = text.strip_suffix('\r').unwrap_or(&*text);
    sanitize(text).into_owned()
}
