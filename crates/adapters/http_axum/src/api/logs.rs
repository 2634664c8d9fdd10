//! Recent log lines.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};
use matterhub_domain::log::LogLine;

use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;

/// Query parameters of `GET /api/logs`.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

/// `GET /api/logs?limit=N`: the latest lines, oldest first.
pub async fn recent<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Query(query): Query<LogsQuery>,
) -> Json<Vec<LogLine>>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    Json(state.log_bus.recent(query.limit.unwrap_or(DEFAULT_LIMIT)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use matterhub_app::ports::LogSink;
    use matterhub_domain::log::LogSource;

    use crate::router;
    use crate::test_support::{StubRunner, test_state};

    #[tokio::test]
    async fn should_return_latest_lines() {
        let (state, _) = test_state(StubRunner::succeeding());
        for i in 0..3 {
            state.log_bus.emit(LogSource::System, format!("line {i}"));
        }
        let app = router::build(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/logs?limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json[0]["message"], "line 1");
        assert_eq!(json[1]["message"], "line 2");
        assert_eq!(json[1]["source"], "system");
    }
}
