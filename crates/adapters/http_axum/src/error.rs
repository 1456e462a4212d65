//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use homegraph_domain::error::{HomeGraphError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HomeGraphError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(HomeGraphError);

impl From<HomeGraphError> for ApiError {
    fn from(err: HomeGraphError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HomeGraphError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HomeGraphError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HomeGraphError::Registry(err) => {
                tracing::error!(error = %err, "registry error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
