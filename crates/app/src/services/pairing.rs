//! Pairing service: commissions a bulb and registers it.
//!
//! One attempt runs at a time. The node id is reserved before the pairing
//! command launches and released again if the attempt fails, so a failed
//! pairing leaves the registry exactly as it was.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use matterhub_domain::command::{ClusterOptions, Command};
use matterhub_domain::device::DeviceRecord;
use matterhub_domain::error::{CommandFailedError, ConflictError, MatterHubError, ValidationError};
use matterhub_domain::id::NodeId;
use matterhub_domain::log::{LogLine, LogSource};
use matterhub_domain::output::extract_product_name;
use matterhub_domain::pairing::{PairingPhase, PairingRequest};

use crate::ports::{CommandRunner, LogSink};
use crate::registry::DeviceRegistry;

/// Application service driving the pairing workflow.
pub struct PairingService<R, S> {
    runner: R,
    sink: S,
    registry: Arc<DeviceRegistry>,
    bypass_attestation: bool,
    shutdown: CancellationToken,
    phase: watch::Sender<PairingPhase>,
    busy: Mutex<()>,
}

impl<R, S> PairingService<R, S>
where
    R: CommandRunner,
    S: LogSink,
{
    /// Create a service. `bypass_attestation` appends
    /// `--bypass-attestation-verifier true` to every pairing command.
    pub fn new(
        runner: R,
        sink: S,
        registry: Arc<DeviceRegistry>,
        bypass_attestation: bool,
        shutdown: CancellationToken,
    ) -> Self {
        let (phase, _) = watch::channel(PairingPhase::Idle);
        Self {
            runner,
            sink,
            registry,
            bypass_attestation,
            shutdown,
            phase,
            busy: Mutex::new(()),
        }
    }

    /// Current phase of the most recent attempt.
    #[must_use]
    pub fn phase(&self) -> PairingPhase {
        self.phase.borrow().clone()
    }

    /// Observe phase changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PairingPhase> {
        self.phase.subscribe()
    }

    /// Pair a device over WiFi, read its product name and register it.
    ///
    /// # Errors
    ///
    /// - [`MatterHubError::Validation`] for an empty pairing code or
    ///   password, or when another pairing is running. No process is
    ///   launched in that case.
    /// - [`MatterHubError::Launch`] if the utility cannot be started.
    /// - [`MatterHubError::CommandFailed`] if the pairing command exits
    ///   with a non-zero status.
    /// - [`MatterHubError::Conflict`] if the record cannot be registered.
    #[tracing::instrument(skip(self, request), fields(ssid = %request.ssid))]
    pub async fn pair(&self, request: PairingRequest) -> Result<DeviceRecord, MatterHubError> {
        let request = request.normalized();
        request.validate()?;
        let _busy = self
            .busy
            .try_lock()
            .map_err(|_| ValidationError::PairingInProgress)?;

        let node_id = self.registry.allocate_node_id();
        let attempt = Attempt::new(self, node_id);
        self.advance(PairingPhase::PairingInProgress { node_id });
        self.sink
            .emit(LogSource::Pairing, "Pairing started...".to_string());
        tracing::info!(%node_id, "pairing started");

        let command = Command::PairCodeWifi {
            node_id,
            ssid: request.ssid.clone(),
            password: request.password,
            pairing_code: request.pairing_code,
            bypass_attestation: self.bypass_attestation,
        };
        let args = command.args(&ClusterOptions::default());
        let stream = self.runner.execute(args, attempt.cancel.child_token())?;

        let outcome = stream.drain_into(&self.sink, LogSource::Pairing).await;
        if !outcome.success() {
            return Err(CommandFailedError {
                command: command.to_string(),
                outcome,
            }
            .into());
        }

        self.advance(PairingPhase::Paired { node_id });
        self.advance(PairingPhase::ProbingName { node_id });
        let name = self.lookup_name(node_id, &attempt.cancel).await;

        let record = self.register(node_id, name, request.ssid)?;
        attempt.complete();
        self.sink.emit(
            LogSource::Pairing,
            format!("{} paired as node {node_id}", record.name),
        );
        tracing::info!(%node_id, name = %record.name, "device registered");
        self.advance(PairingPhase::Registered {
            node_id,
            name: record.name.clone(),
        });
        Ok(record)
    }

    /// Read the advertised product name, falling back to `Bulb <node_id>`.
    ///
    /// Lookup failures are logged and never abort the pairing.
    async fn lookup_name(&self, node_id: NodeId, cancel: &CancellationToken) -> String {
        let command = Command::ReadProductName { node_id };
        let args = command.args(&ClusterOptions::default());
        let captured = match self.runner.execute(args, cancel.child_token()) {
            Ok(stream) => stream.collect().await,
            Err(err) => {
                tracing::warn!(%node_id, error = %err, "product name lookup could not start");
                return DeviceRecord::default_name(node_id);
            }
        };

        for line in &captured.lines {
            self.sink
                .append(LogLine::new(LogSource::Pairing, line.clone()));
        }
        if !captured.outcome.success() {
            tracing::warn!(%node_id, outcome = %captured.outcome, "product name lookup failed");
        }

        match extract_product_name(&captured.text()) {
            Some(name) => {
                self.sink
                    .emit(LogSource::Pairing, format!("{name} device name detected."));
                name
            }
            None => DeviceRecord::default_name(node_id),
        }
    }

    /// Insert the record, suffixing the node id when the name is taken.
    fn register(
        &self,
        node_id: NodeId,
        name: String,
        ssid: String,
    ) -> Result<DeviceRecord, MatterHubError> {
        let build = |name: String| {
            DeviceRecord::builder()
                .name(name)
                .node_id(node_id)
                .network_ssid(ssid.clone())
                .build()
        };

        match self.registry.insert(build(name.clone())?) {
            Err(MatterHubError::Conflict(ConflictError::DuplicateName(_))) => {
                self.registry.insert(build(format!("{name} ({node_id})"))?)
            }
            other => other,
        }
    }

    fn fail(&self, node_id: NodeId) {
        self.registry.release_node_id(node_id);
        self.sink
            .emit(LogSource::Pairing, "Pairing failed".to_string());
        tracing::warn!(%node_id, "pairing failed");
        self.advance(PairingPhase::PairFailed { node_id });
    }

    fn advance(&self, next: PairingPhase) {
        self.phase.send_modify(|current| {
            if !current.can_advance_to(&next) {
                tracing::warn!(from = %current, to = %next, "unexpected pairing transition");
            }
            *current = next;
        });
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }
}

/// An attempt in flight. Unless completed, dropping it kills the attempt's
/// processes, releases the node id and marks the pairing as failed. This
/// also covers a caller that stops polling [`PairingService::pair`].
struct Attempt<'a, R, S>
where
    R: CommandRunner,
    S: LogSink,
{
    service: &'a PairingService<R, S>,
    node_id: NodeId,
    cancel: CancellationToken,
    completed: bool,
}

impl<'a, R, S> Attempt<'a, R, S>
where
    R: CommandRunner,
    S: LogSink,
{
    fn new(service: &'a PairingService<R, S>, node_id: NodeId) -> Self {
        Self {
            service,
            node_id,
            cancel: service.shutdown.child_token(),
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl<R, S> Drop for Attempt<'_, R, S>
where
    R: CommandRunner,
    S: LogSink,
{
    fn drop(&mut self) {
        if !self.completed {
            self.cancel.cancel();
            self.service.fail(self.node_id);
        }
    }
}
