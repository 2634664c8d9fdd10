//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
pub mod logs;
#[allow(clippy::missing_errors_doc)]
pub mod pairing;
#[allow(clippy::missing_errors_doc)]
pub mod scenes;
pub mod sse;
pub mod status;
#[allow(clippy::missing_errors_doc)]
pub mod wifi;

use axum::Router;
use axum::routing::{get, post};

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, S, N>() -> Router<AppState<R, S, N>>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    Router::new()
        // Devices
        .route("/devices", get(devices::list::<R, S, N>))
        .route(
            "/devices/{name}",
            get(devices::get::<R, S, N>).delete(devices::delete::<R, S, N>),
        )
        .route("/devices/{name}/power", post(devices::power::<R, S, N>))
        .route(
            "/devices/{name}/brightness",
            post(devices::brightness::<R, S, N>),
        )
        .route("/devices/{name}/color", post(devices::color::<R, S, N>))
        // Pairing
        .route(
            "/pairing",
            get(pairing::phase::<R, S, N>).post(pairing::pair::<R, S, N>),
        )
        // Scenes
        .route("/scenes", get(scenes::list))
        .route("/scenes/{label}", post(scenes::run::<R, S, N>))
        // Host
        .route("/wifi", get(wifi::scan::<R, S, N>))
        .route("/status", get(status::get::<R, S, N>))
        // Logs
        .route("/logs", get(logs::recent::<R, S, N>))
        .route("/logs/stream", get(sse::stream::<R, S, N>))
}
