//! Shared application state for axum handlers.

use std::sync::Arc;

use matterhub_app::log_bus::InProcessLogBus;
use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};
use matterhub_app::registry::DeviceRegistry;
use matterhub_app::scheduler::AutomationScheduler;
use matterhub_app::services::dispatcher::CommandDispatcher;
use matterhub_app::services::pairing::PairingService;

/// Application state shared across all axum handlers.
///
/// Generic over the command runner, log sink and network scanner to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<R, S, N> {
    /// Power, brightness and colour commands.
    pub dispatcher: Arc<CommandDispatcher<R, S>>,
    pub pairing: Arc<PairingService<R, S>>,
    /// Automation loop, used for its status and one-shot scenes.
    pub scheduler: Arc<AutomationScheduler<R, S>>,
    pub scanner: Arc<N>,
    /// Recent and live log lines.
    pub log_bus: Arc<InProcessLogBus>,
}

impl<R, S, N> Clone for AppState<R, S, N> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            pairing: Arc::clone(&self.pairing),
            scheduler: Arc::clone(&self.scheduler),
            scanner: Arc::clone(&self.scanner),
            log_bus: Arc::clone(&self.log_bus),
        }
    }
}

impl<R, S, N> AppState<R, S, N>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The services are typically shared with background tasks (the
    /// automation loop, the log writer) before the HTTP state is built.
    pub fn from_arcs(
        dispatcher: Arc<CommandDispatcher<R, S>>,
        pairing: Arc<PairingService<R, S>>,
        scheduler: Arc<AutomationScheduler<R, S>>,
        scanner: Arc<N>,
        log_bus: Arc<InProcessLogBus>,
    ) -> Self {
        Self {
            dispatcher,
            pairing,
            scheduler,
            scanner,
            log_bus,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        self.dispatcher.registry()
    }
}
