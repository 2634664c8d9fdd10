//! Stub ports and state used by the handler tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use matterhub_app::log_bus::InProcessLogBus;
use matterhub_app::ports::{CommandEvent, CommandRunner, CommandStream, NetworkScanner};
use matterhub_app::registry::DeviceRegistry;
use matterhub_app::scheduler::AutomationScheduler;
use matterhub_app::services::dispatcher::CommandDispatcher;
use matterhub_app::services::pairing::PairingService;
use matterhub_domain::command::{ClusterOptions, CommandOutcome};
use matterhub_domain::error::MatterHubError;

use crate::state::AppState;

/// Runner answering every command with the same exit code. The product-name
/// lookup prints `ProductName: <product_name>` when one is set.
pub struct StubRunner {
    code: i32,
    product_name: Option<&'static str>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StubRunner {
    pub fn succeeding() -> Self {
        Self::exiting(0)
    }

    pub fn exiting(code: i32) -> Self {
        Self {
            code,
            product_name: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_product_name(mut self, name: &'static str) -> Self {
        self.product_name = Some(name);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for StubRunner {
    fn execute(
        &self,
        args: Vec<String>,
        _cancel: CancellationToken,
    ) -> Result<CommandStream, MatterHubError> {
        let lookup = args.first().is_some_and(|a| a == "basicinformation");
        self.calls.lock().unwrap().push(args);

        let (tx, stream) = CommandStream::channel(2);
        if let (true, Some(name)) = (lookup, self.product_name) {
            tx.try_send(CommandEvent::Line(format!("ProductName: {name}")))
                .unwrap();
        }
        tx.try_send(CommandEvent::Done(CommandOutcome::Exited(self.code)))
            .unwrap();
        Ok(stream)
    }
}

pub struct StubScanner;

impl NetworkScanner for StubScanner {
    async fn scan(&self) -> Result<Vec<String>, MatterHubError> {
        Ok(vec!["Home".to_string(), "Office".to_string()])
    }
}

pub type TestState = AppState<Arc<StubRunner>, Arc<InProcessLogBus>, StubScanner>;

pub fn test_state(runner: StubRunner) -> (TestState, Arc<StubRunner>) {
    let runner = Arc::new(runner);
    let log_bus = Arc::new(InProcessLogBus::new(64));
    let registry = Arc::new(DeviceRegistry::new());
    let shutdown = CancellationToken::new();

    let dispatcher = Arc::new(CommandDispatcher::new(
        Arc::clone(&runner),
        Arc::clone(&log_bus),
        Arc::clone(&registry),
        ClusterOptions::default(),
        shutdown.clone(),
    ));
    let pairing = Arc::new(PairingService::new(
        Arc::clone(&runner),
        Arc::clone(&log_bus),
        registry,
        false,
        shutdown,
    ));
    let scheduler = Arc::new(AutomationScheduler::new(
        Arc::clone(&dispatcher),
        Vec::new(),
        Duration::from_millis(10),
    ));

    let state = AppState::from_arcs(
        dispatcher,
        pairing,
        scheduler,
        Arc::new(StubScanner),
        log_bus,
    );
    (state, runner)
}
