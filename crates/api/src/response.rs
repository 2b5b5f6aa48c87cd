//! Response types for the queue endpoints.
//!
//! Queue responses are pretty-printed JSON so they read well from `curl`.

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use upqueue_core::Task;

/// `{ "tasks": [...] }` view of the waiting set.
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub tasks: Vec<Task>,
}

/// JSON response serialized with indentation.
#[derive(Debug)]
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.0) {
            Ok(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
