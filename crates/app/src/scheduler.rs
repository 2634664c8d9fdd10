//! Automation scheduler: loops scenes over every registered device.
//!
//! A pass walks the configured program: for each scene, for each device in
//! registry order, for each step, it dispatches the command, waits for it to
//! finish, publishes a status string and pauses for the scene's delay. The
//! registry is re-read at the start of every scene so devices paired or
//! removed mid-run are picked up.
//!
//! Cancellation is observed between steps and interrupts pauses. A command
//! that is already running is always awaited to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use matterhub_domain::error::{MatterHubError, ValidationError};
use matterhub_domain::log::LogSource;
use matterhub_domain::scene::Scene;

use crate::ports::{CommandRunner, LogSink};
use crate::services::dispatcher::CommandDispatcher;

/// Status shown while the registry is empty.
pub const WAITING_STATUS: &str = "Waiting for devices...";

/// Counters for one pass (or one scene run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub dispatched: usize,
    pub failed: usize,
    /// The pass stopped early because cancellation was requested.
    pub cancelled: bool,
}

impl PassReport {
    fn absorb(&mut self, other: Self) {
        self.dispatched += other.dispatched;
        self.failed += other.failed;
        self.cancelled |= other.cancelled;
    }
}

/// Cyclic scene runner.
pub struct AutomationScheduler<R, S> {
    dispatcher: Arc<CommandDispatcher<R, S>>,
    program: Vec<Scene>,
    idle_interval: Duration,
    status: watch::Sender<String>,
}

impl<R, S> AutomationScheduler<R, S>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
{
    /// Create a scheduler looping over `program`, re-checking an empty
    /// registry every `idle_interval`.
    pub fn new(
        dispatcher: Arc<CommandDispatcher<R, S>>,
        program: Vec<Scene>,
        idle_interval: Duration,
    ) -> Self {
        let (status, _) = watch::channel(String::new());
        Self {
            dispatcher,
            program,
            idle_interval,
            status,
        }
    }

    /// Latest status string.
    #[must_use]
    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn program(&self) -> &[Scene] {
        &self.program
    }

    /// Spawn [`AutomationScheduler::run`] on its own task.
    pub fn start(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            scenes = self.program.len(),
            idle_ms = u64::try_from(self.idle_interval.as_millis()).unwrap_or(u64::MAX),
            "automation started"
        );
        while !cancel.is_cancelled() {
            if self.dispatcher.registry().is_empty() || self.program.is_empty() {
                self.publish_waiting();
                if !pause(self.idle_interval, &cancel).await {
                    break;
                }
                continue;
            }

            let report = self.run_pass(&cancel).await;
            tracing::debug!(
                dispatched = report.dispatched,
                failed = report.failed,
                "automation pass finished"
            );
            if report.cancelled {
                break;
            }
        }
        tracing::info!("automation stopped");
    }

    /// Run every scene of the program once.
    pub async fn run_pass(&self, cancel: &CancellationToken) -> PassReport {
        let mut report = PassReport::default();
        for scene in &self.program {
            report.absorb(self.run_scene(scene, cancel).await);
            if report.cancelled {
                break;
            }
        }
        report
    }

    /// Apply a built-in scene to all devices once.
    ///
    /// With an empty registry nothing is dispatched and
    /// `No devices connected` is logged.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownScene`] if `label` is not a
    /// built-in scene.
    #[tracing::instrument(skip(self))]
    pub async fn run_scene_once(&self, label: &str) -> Result<PassReport, MatterHubError> {
        let scene =
            Scene::builtin(label).ok_or_else(|| ValidationError::UnknownScene(label.to_string()))?;
        if self.dispatcher.registry().is_empty() {
            self.dispatcher
                .sink()
                .emit(LogSource::Automation, "No devices connected".to_string());
            return Ok(PassReport::default());
        }
        Ok(self.run_scene(&scene, &CancellationToken::new()).await)
    }

    async fn run_scene(&self, scene: &Scene, cancel: &CancellationToken) -> PassReport {
        let mut report = PassReport::default();
        let devices = self.dispatcher.registry().list();

        for device in &devices {
            for step in &scene.steps {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    return report;
                }

                let result = match self.dispatcher.dispatch(step.command(device.node_id)) {
                    Ok(dispatch) => dispatch.confirm().await.map(|_| ()),
                    Err(err) => Err(err),
                };
                match result {
                    Ok(()) => {
                        report.dispatched += 1;
                        self.publish(format!("AUTO → {step} {}", device.name));
                    }
                    Err(err) => {
                        report.failed += 1;
                        tracing::warn!(
                            scene = %scene.label,
                            device = %device.name,
                            error = %err,
                            "automation step failed"
                        );
                        self.publish(format!("AUTO → {step} {} failed: {err}", device.name));
                    }
                }

                if !pause(scene.step_delay(), cancel).await {
                    report.cancelled = true;
                    return report;
                }
            }
        }
        report
    }

    /// Publish a step status. Every call is logged, even when the status
    /// repeats the previous one.
    fn publish(&self, status: String) {
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                current.clone_from(&status);
                true
            }
        });
        self.dispatcher.sink().emit(LogSource::Automation, status);
    }

    /// Publish [`WAITING_STATUS`], logging it only when it is new.
    fn publish_waiting(&self) {
        let changed = self.status.send_if_modified(|current| {
            if *current == WAITING_STATUS {
                false
            } else {
                WAITING_STATUS.clone_into(current);
                true
            }
        });
        if changed {
            self.dispatcher
                .sink()
                .emit(LogSource::Automation, WAITING_STATUS.to_string());
        }
    }
}

/// Sleep for `duration`; `false` if `cancel` fired first.
///
/// A zero duration still yields to the runtime.
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        tokio::task::yield_now().await;
        return !cancel.is_cancelled();
    }
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}
