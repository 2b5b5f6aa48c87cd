use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Liveness greeting served at `/`.
pub const GREETING: &str = "hello, upqueue!";

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Tasks admitted but not yet settled.
    pub in_flight: usize,
    /// Size of the worker pool.
    pub workers: usize,
}

/// GET / -- plain-text liveness check.
pub async fn greeting() -> &'static str {
    GREETING
}

/// GET /health -- service status and dispatcher load.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        in_flight: state.dispatcher.in_flight(),
        workers: state.dispatcher.config().pool_size,
    })
}
