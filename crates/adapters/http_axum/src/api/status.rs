//! Aggregated runtime status.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};
use matterhub_domain::pairing::PairingPhase;

use crate::state::AppState;

/// Body of `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Latest automation status line, empty before the first pass.
    pub automation: String,
    pub pairing: PairingPhase,
    pub devices: usize,
}

/// `GET /api/status`
pub async fn get<R, S, N>(State(state): State<AppState<R, S, N>>) -> Json<StatusResponse>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    Json(StatusResponse {
        automation: state.scheduler.status(),
        pairing: state.pairing.phase(),
        devices: state.registry().len(),
    })
}
