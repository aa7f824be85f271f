use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bareminimum_shared::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Errors raised while accepting a request, before anything is sent upstream.
///
/// Upstream failures are not represented here: the upstream client absorbs
/// them into a regular response envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Expected a multipart/form-data body: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("Failed to read form data: {0}")]
    Multipart(#[from] MultipartError),
}

impl AppError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AppError::Validation(err) => Some(err.field),
            AppError::NotMultipart(_) | AppError::Multipart(_) => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NotMultipart(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(err) => err.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.field() {
            Some(field) => json!({ "detail": self.to_string(), "field": field }),
            None => json!({ "detail": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}
