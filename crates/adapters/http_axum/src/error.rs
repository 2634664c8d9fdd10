//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use matterhub_domain::error::MatterHubError;

/// JSON error body returned by every endpoint.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`MatterHubError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(MatterHubError);

impl From<MatterHubError> for ApiError {
    fn from(err: MatterHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            MatterHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            MatterHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            MatterHubError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            MatterHubError::CommandFailed(err) => {
                tracing::warn!(error = %err, "control utility command failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            MatterHubError::Launch(err) => {
                tracing::error!(error = %err, "failed to launch control utility");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to launch control utility".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
