//! Command relay: minimal node-id based control endpoints.
//!
//! Each endpoint runs one controller command, waits for it to finish and
//! answers with a short status string. Node ids do not need to be known to
//! the registry.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};
use matterhub_domain::id::NodeId;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /on` and `POST /off`.
#[derive(Debug, Deserialize)]
pub struct PowerRequest {
    pub node_id: NodeId,
}

/// Body of `POST /brightness`.
#[derive(Debug, Deserialize)]
pub struct BrightnessRequest {
    pub node_id: NodeId,
    pub level: i64,
}

/// Body of `POST /color`.
#[derive(Debug, Deserialize)]
pub struct ColorRequest {
    pub node_id: NodeId,
    pub hue: i64,
    pub sat: i64,
}

/// Response body of every relay endpoint.
#[derive(Debug, Serialize)]
pub struct RelayStatus {
    pub status: &'static str,
}

/// Build the relay sub-router.
pub fn routes<R, S, N>() -> Router<AppState<R, S, N>>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    Router::new()
        .route("/", get(home))
        .route("/on", post(on::<R, S, N>))
        .route("/off", post(off::<R, S, N>))
        .route("/brightness", post(brightness::<R, S, N>))
        .route("/color", post(color::<R, S, N>))
}

async fn home() -> &'static str {
    "Matter Server Running"
}

/// `POST /on`
pub async fn on<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Json(req): Json<PowerRequest>,
) -> Result<Json<RelayStatus>, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    state.dispatcher.power(req.node_id, true)?.confirm().await?;
    Ok(Json(RelayStatus { status: "on" }))
}

/// `POST /off`
pub async fn off<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Json(req): Json<PowerRequest>,
) -> Result<Json<RelayStatus>, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    state.dispatcher.power(req.node_id, false)?.confirm().await?;
    Ok(Json(RelayStatus { status: "off" }))
}

/// `POST /brightness`
pub async fn brightness<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Json(req): Json<BrightnessRequest>,
) -> Result<Json<RelayStatus>, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    state
        .dispatcher
        .set_brightness(req.node_id, req.level)?
        .confirm()
        .await?;
    Ok(Json(RelayStatus {
        status: "brightness set",
    }))
}

/// `POST /color`
pub async fn color<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Json(req): Json<ColorRequest>,
) -> Result<Json<RelayStatus>, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    state
        .dispatcher
        .set_color(req.node_id, req.hue, req.sat)?
        .confirm()
        .await?;
    Ok(Json(RelayStatus {
        status: "color set",
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::router;
    use crate::test_support::{StubRunner, test_state};

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_switch_on_and_report_status() {
        let (state, runner) = test_state(StubRunner::succeeding());
        let app = router::build(state);

        let response = app
            .oneshot(post_json("/on", r#"{"node_id": 2}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "on");
        assert_eq!(runner.calls(), [["onoff", "on", "2", "1"]]);
    }

    #[tokio::test]
    async fn should_clamp_relay_brightness() {
        let (state, runner) = test_state(StubRunner::succeeding());
        let app = router::build(state);

        let response = app
            .oneshot(post_json("/brightness", r#"{"node_id": 3, "level": 999}"#))
            .await
            .unwrap();

        assert_eq!(body_json(response).await["status"], "brightness set");
        assert_eq!(
            runner.calls()[0],
            ["levelcontrol", "move-to-level", "254", "5", "0", "0", "3", "1"]
        );
    }

    #[tokio::test]
    async fn should_relay_color_with_sat_field() {
        let (state, runner) = test_state(StubRunner::succeeding());
        let app = router::build(state);

        let response = app
            .oneshot(post_json(
                "/color",
                r#"{"node_id": 2, "hue": 20, "sat": 200}"#,
            ))
            .await
            .unwrap();

        assert_eq!(body_json(response).await["status"], "color set");
        assert_eq!(runner.calls()[0][2..4], ["20", "200"]);
    }

    #[tokio::test]
    async fn should_return_bad_gateway_when_command_fails() {
        let (state, _) = test_state(StubRunner::exiting(1));
        let app = router::build(state);

        let response = app
            .oneshot(post_json("/off", r#"{"node_id": 2}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_answer_home_banner() {
        let (state, _) = test_state(StubRunner::succeeding());
        let app = router::build(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"Matter Server Running");
    }
}
