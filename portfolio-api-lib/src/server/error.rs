use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure returned by a route handler.
///
/// The display text is exactly what the client sees in the `{"error": ...}` envelope. Causes
/// are logged by the handler before conversion and never reach the response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    UpstreamUnavailable(&'static str),

    #[error("{0}")]
    MalformedUpstream(&'static str),

    #[error("CAPTCHA verification failed")]
    VerificationFailed,

    #[error("Failed to send email")]
    SendFailed,

    #[error("Internal server error")]
    Internal,

    #[error("Not found")]
    NotFound,
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::VerificationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable(_) | Self::MalformedUpstream(_) | Self::SendFailed | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
