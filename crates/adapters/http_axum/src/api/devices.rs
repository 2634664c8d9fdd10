//! JSON REST handlers for registered devices.
//!
//! Devices are addressed by name. Control endpoints resolve the name to a
//! node id, wait for the controller to finish and return the updated record.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};
use matterhub_app::services::dispatcher::Dispatch;
use matterhub_domain::device::DeviceRecord;
use matterhub_domain::error::{MatterHubError, NotFoundError};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for switching a device.
#[derive(Debug, Deserialize)]
pub struct PowerRequest {
    pub on: bool,
}

/// Request body for changing brightness.
#[derive(Debug, Deserialize)]
pub struct BrightnessRequest {
    pub level: i64,
}

/// Request body for changing colour.
#[derive(Debug, Deserialize)]
pub struct ColorRequest {
    pub hue: i64,
    pub saturation: i64,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<DeviceRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and control endpoints.
pub enum GetResponse {
    Ok(Json<DeviceRecord>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<R, S, N>(State(state): State<AppState<R, S, N>>) -> ListResponse
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    ListResponse::Ok(Json(state.registry().list()))
}

/// `GET /api/devices/{name}`
pub async fn get<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Path(name): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let device = state.registry().get(&name)?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `DELETE /api/devices/{name}`
pub async fn delete<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Path(name): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    match state.registry().remove(&name) {
        Some(removed) => {
            tracing::info!(name = %removed.name, node_id = %removed.node_id, "device removed");
            Ok(DeleteResponse::NoContent)
        }
        None => Err(MatterHubError::from(NotFoundError {
            entity: "Device",
            id: name,
        })
        .into()),
    }
}

/// `POST /api/devices/{name}/power`
pub async fn power<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Path(name): Path<String>,
    Json(req): Json<PowerRequest>,
) -> Result<GetResponse, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let device = state.registry().get(&name)?;
    let dispatch = state.dispatcher.power(device.node_id, req.on)?;
    finish(&state, &name, dispatch).await
}

/// `POST /api/devices/{name}/brightness`
pub async fn brightness<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Path(name): Path<String>,
    Json(req): Json<BrightnessRequest>,
) -> Result<GetResponse, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let device = state.registry().get(&name)?;
    let dispatch = state.dispatcher.set_brightness(device.node_id, req.level)?;
    finish(&state, &name, dispatch).await
}

/// `POST /api/devices/{name}/color`
pub async fn color<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Path(name): Path<String>,
    Json(req): Json<ColorRequest>,
) -> Result<GetResponse, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let device = state.registry().get(&name)?;
    let dispatch = state
        .dispatcher
        .set_color(device.node_id, req.hue, req.saturation)?;
    finish(&state, &name, dispatch).await
}

async fn finish<R, S, N>(
    state: &AppState<R, S, N>,
    name: &str,
    dispatch: Dispatch,
) -> Result<GetResponse, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    dispatch.confirm().await?;
    let device = state.registry().get(name)?;
    Ok(GetResponse::Ok(Json(device)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use matterhub_domain::device::DeviceRecord;
    use matterhub_domain::id::NodeId;

    use crate::router;
    use crate::test_support::{StubRunner, TestState, test_state};

    fn with_lamp(runner: StubRunner) -> TestState {
        let (state, _) = test_state(runner);
        state
            .registry()
            .insert(
                DeviceRecord::builder()
                    .name("Lamp")
                    .node_id(NodeId::new(2))
                    .network_ssid("Home")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        state
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_list_registered_devices() {
        let app = router::build(with_lamp(StubRunner::succeeding()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/devices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["name"], "Lamp");
        assert_eq!(json[0]["node_id"], 2);
        assert_eq!(json[0]["color"], "#ffffff");
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_device() {
        let app = router::build(with_lamp(StubRunner::succeeding()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/devices/Ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_delete_device() {
        let state = with_lamp(StubRunner::succeeding());
        let app = router::build(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/devices/Lamp")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.registry().is_empty());
    }

    #[tokio::test]
    async fn should_power_device_by_name_and_return_updated_record() {
        let app = router::build(with_lamp(StubRunner::succeeding()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/devices/Lamp/power")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"on": true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["power_state"], true);
    }

    #[tokio::test]
    async fn should_store_color_set_by_name() {
        let app = router::build(with_lamp(StubRunner::succeeding()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/devices/Lamp/color")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"hue": 0, "saturation": 254}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_json(response).await["color"], "#ff0000");
    }
}
