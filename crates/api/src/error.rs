use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request body could not be decoded into a task.
    #[error("Failed to decode request body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Decode failures map to 500 to match the control surface contract.
        let (status, code, message) = match &self {
            AppError::Decode(err) => {
                tracing::warn!(error = %err, "Rejected undecodable task");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DECODE_ERROR",
                    format!("Invalid task JSON: {err}"),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
