use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Mount liveness and health routes at the root.
///
/// ```text
/// GET    /          greeting
/// GET    /health    health_check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::greeting))
        .route("/health", get(health::health_check))
}
