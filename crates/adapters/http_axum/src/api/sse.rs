//! Server-Sent Events (SSE) stream of log lines.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};

use crate::state::AppState;

/// `GET /api/logs/stream`: live log lines as JSON `data:` frames.
///
/// The stream continues until the client disconnects or the log bus is
/// dropped.
pub async fn stream<R, S, N>(
    State(state): State<AppState<R, S, N>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let lines = BroadcastStream::new(state.log_bus.subscribe()).filter_map(|result| match result {
        Ok(line) => match serde_json::to_string(&line) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize log line for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some log lines were dropped");
            None
        }
    });

    Sse::new(lines).keep_alive(KeepAlive::default())
}
