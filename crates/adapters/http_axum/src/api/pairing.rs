//! JSON REST handlers for the pairing workflow.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};
use matterhub_domain::device::DeviceRecord;
use matterhub_domain::pairing::{PairingPhase, PairingRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the pair endpoint.
pub enum PairResponse {
    Created(Json<DeviceRecord>),
}

impl IntoResponse for PairResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/pairing`: phase of the most recent attempt.
pub async fn phase<R, S, N>(State(state): State<AppState<R, S, N>>) -> Json<PairingPhase>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    Json(state.pairing.phase())
}

/// `POST /api/pairing`: commission a device and register it.
///
/// Answers once the device is registered, which includes the product-name
/// lookup.
pub async fn pair<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Json(req): Json<PairingRequest>,
) -> Result<PairResponse, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let record = state.pairing.pair(req).await?;
    Ok(PairResponse::Created(Json(record)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::router;
    use crate::test_support::{StubRunner, test_state};

    fn pair_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/pairing")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_device_from_pairing() {
        let (state, runner) = test_state(StubRunner::succeeding().with_product_name("Lamp"));
        let app = router::build(state.clone());

        let response = app
            .oneshot(pair_request(
                r#"{"pairing_code": "MT:ABC", "ssid": "Home", "password": "pw1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["name"], "Lamp");
        assert_eq!(json["node_id"], 2);
        assert_eq!(runner.calls().len(), 2);
        assert_eq!(state.registry().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_empty_password_with_400() {
        let (state, runner) = test_state(StubRunner::succeeding());
        let app = router::build(state);

        let response = app
            .oneshot(pair_request(
                r#"{"pairing_code": "MT:ABC", "ssid": "Home", "password": ""}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn should_report_failed_pairing_as_bad_gateway() {
        let (state, _) = test_state(StubRunner::exiting(1));
        let app = router::build(state.clone());

        let response = app
            .oneshot(pair_request(
                r#"{"pairing_code": "MT:ABC", "ssid": "Home", "password": "pw1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(state.registry().is_empty());
    }
}
