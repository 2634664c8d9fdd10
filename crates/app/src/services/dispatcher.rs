//! Command dispatcher: turns user intents into control-utility invocations.
//!
//! Every dispatch updates the matching registry record *optimistically*: the
//! new power state, level or colour is stored as soon as the process has been
//! launched, before its exit status is known. A failed command therefore
//! leaves the record showing the intended state; callers that care use
//! [`Dispatch::confirm`].

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use matterhub_domain::color::RgbColor;
use matterhub_domain::command::{ClusterOptions, Command, CommandOutcome, clamp_level};
use matterhub_domain::error::{CommandFailedError, MatterHubError};
use matterhub_domain::id::NodeId;
use matterhub_domain::log::LogSource;

use crate::ports::{CommandRunner, LogSink};
use crate::registry::DeviceRegistry;

/// A launched command whose output is being forwarded to the log sink.
#[derive(Debug)]
pub struct Dispatch {
    command: Command,
    handle: JoinHandle<CommandOutcome>,
}

impl Dispatch {
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Wait until the process ended and all of its lines reached the sink.
    pub async fn outcome(self) -> CommandOutcome {
        self.handle.await.unwrap_or(CommandOutcome::Terminated)
    }

    /// Like [`Dispatch::outcome`], but a non-zero exit is an error.
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::CommandFailed`] unless the process exited
    /// with status zero.
    pub async fn confirm(self) -> Result<CommandOutcome, MatterHubError> {
        let command = self.command.to_string();
        let outcome = self.outcome().await;
        if outcome.success() {
            Ok(outcome)
        } else {
            Err(CommandFailedError { command, outcome }.into())
        }
    }
}

/// Application service for power, brightness and colour commands.
pub struct CommandDispatcher<R, S> {
    runner: R,
    sink: S,
    registry: Arc<DeviceRegistry>,
    options: ClusterOptions,
    shutdown: CancellationToken,
}

impl<R, S> CommandDispatcher<R, S>
where
    R: CommandRunner,
    S: LogSink + Clone + 'static,
{
    /// Create a dispatcher. Cancelling `shutdown` kills every in-flight
    /// process it launched.
    pub fn new(
        runner: R,
        sink: S,
        registry: Arc<DeviceRegistry>,
        options: ClusterOptions,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            runner,
            sink,
            registry,
            options,
            shutdown,
        }
    }

    /// Switch a device on or off.
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::Launch`] if the utility cannot be started.
    #[tracing::instrument(skip(self), fields(node_id = %node_id))]
    pub fn power(&self, node_id: NodeId, on: bool) -> Result<Dispatch, MatterHubError> {
        self.dispatch(Command::OnOff { node_id, on })
    }

    /// Move a device to `level`, clamped into `0..=254`.
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::Launch`] if the utility cannot be started.
    #[tracing::instrument(skip(self), fields(node_id = %node_id))]
    pub fn set_brightness(&self, node_id: NodeId, level: i64) -> Result<Dispatch, MatterHubError> {
        self.dispatch(Command::MoveToLevel {
            node_id,
            level: clamp_level(level),
        })
    }

    /// Move a device to the given hue and saturation, both clamped into
    /// `0..=254`.
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::Launch`] if the utility cannot be started.
    #[tracing::instrument(skip(self), fields(node_id = %node_id))]
    pub fn set_color(
        &self,
        node_id: NodeId,
        hue: i64,
        saturation: i64,
    ) -> Result<Dispatch, MatterHubError> {
        self.dispatch(Command::MoveToHueAndSaturation {
            node_id,
            hue: clamp_level(hue),
            saturation: clamp_level(saturation),
        })
    }

    /// Launch an arbitrary cluster command.
    ///
    /// Node ids that are not in the registry are still sent to the utility.
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::Launch`] if the utility cannot be started.
    /// Nothing is logged to the sink and the registry is untouched in that
    /// case.
    pub fn dispatch(&self, command: Command) -> Result<Dispatch, MatterHubError> {
        let args = command.args(&self.options);
        let stream = self.runner.execute(args, self.shutdown.child_token())?;

        self.sink
            .emit(LogSource::Command, format!("Running: {command}"));
        self.apply_optimistic(&command);

        let sink = self.sink.clone();
        let label = command.to_string();
        let handle = tokio::spawn(async move {
            let outcome = stream.drain_into(&sink, LogSource::Command).await;
            if outcome.success() {
                tracing::debug!(command = %label, "command completed");
            } else {
                tracing::warn!(command = %label, %outcome, "command did not succeed");
                sink.emit(LogSource::Command, format!("`{label}` {outcome}"));
            }
            outcome
        });

        Ok(Dispatch { command, handle })
    }

    fn apply_optimistic(&self, command: &Command) {
        let node_id = command.node_id();
        match *command {
            Command::OnOff { on, .. } => {
                self.registry
                    .update_by_node(node_id, |r| r.power_state = on);
            }
            Command::MoveToLevel { level, .. } => {
                self.registry
                    .update_by_node(node_id, |r| r.level = Some(level));
            }
            Command::MoveToHueAndSaturation {
                hue, saturation, ..
            } => {
                let color = RgbColor::from_hue_saturation(hue, saturation);
                self.registry.update_by_node(node_id, |r| r.color = color);
            }
            Command::PairCodeWifi { .. } | Command::ReadProductName { .. } => {}
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[must_use]
    pub fn options(&self) -> ClusterOptions {
        self.options
    }
}
