//! # matterhubd: matterhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize tracing and the log file writer
//! - Construct the controller runner and the WiFi scanner (adapters)
//! - Construct the registry, dispatcher, pairing service and automation loop
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), killing in-flight commands
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod log_file;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use matterhub_adapter_chip_tool::{ChipToolRunner, NmcliScanner};
use matterhub_adapter_http_axum::state::AppState;
use matterhub_app::log_bus::InProcessLogBus;
use matterhub_app::ports::LogSink;
use matterhub_app::registry::DeviceRegistry;
use matterhub_app::scheduler::AutomationScheduler;
use matterhub_app::services::dispatcher::CommandDispatcher;
use matterhub_app::services::pairing::PairingService;
use matterhub_domain::log::LogSource;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log bus
    let log_bus = Arc::new(InProcessLogBus::with_channel_capacity(
        config.logging.history,
        config.logging.buffer,
    ));
    let writer_cancel = CancellationToken::new();
    let writer = log_file::spawn(
        log_bus.subscribe(),
        config.logging.file().cloned(),
        writer_cancel.clone(),
    );

    // Adapters
    let runner = Arc::new(ChipToolRunner::new(&config.chip_tool));
    let scanner = Arc::new(NmcliScanner::new(&config.chip_tool));
    tracing::info!(program = %runner.program().display(), "using control utility");

    // Services
    let shutdown = CancellationToken::new();
    let registry = Arc::new(DeviceRegistry::new());
    let dispatcher = Arc::new(CommandDispatcher::new(
        Arc::clone(&runner),
        Arc::clone(&log_bus),
        Arc::clone(&registry),
        config.chip_tool.cluster,
        shutdown.clone(),
    ));
    let pairing = Arc::new(PairingService::new(
        runner,
        Arc::clone(&log_bus),
        registry,
        config.chip_tool.bypass_attestation,
        shutdown.clone(),
    ));
    let scheduler = Arc::new(AutomationScheduler::new(
        Arc::clone(&dispatcher),
        config.automation.scenes(),
        config.automation.idle_interval(),
    ));

    let scheduler_cancel = CancellationToken::new();
    let automation = if config.automation.enabled {
        Some(Arc::clone(&scheduler).start(scheduler_cancel.clone()))
    } else {
        tracing::info!("automation loop disabled");
        None
    };

    // HTTP
    let state = AppState::from_arcs(dispatcher, pairing, scheduler, scanner, Arc::clone(&log_bus));
    let app = matterhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "matterhubd listening");
    log_bus.emit(LogSource::System, "Matter Server Running".to_string());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    scheduler_cancel.cancel();
    if let Some(handle) = automation {
        if let Err(err) = handle.await {
            tracing::warn!(error = %err, "automation loop panicked");
        }
    }
    shutdown.cancel();
    writer_cancel.cancel();
    if let Err(err) = writer.await {
        tracing::warn!(error = %err, "log writer panicked");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
