//! WiFi network listing used to pick the provisioning network.

use axum::Json;
use axum::extract::State;

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/wifi`: SSIDs visible to the host.
pub async fn scan<R, S, N>(
    State(state): State<AppState<R, S, N>>,
) -> Result<Json<Vec<String>>, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let ssids = state.scanner.scan().await?;
    Ok(Json(ssids))
}
