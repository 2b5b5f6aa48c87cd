use axum::routing::{get, post};
use axum::Router;

use crate::handlers::queue;
use crate::state::AppState;

/// Upload queue routes that answer immediately, mounted at the root.
///
/// ```text
/// GET        /queue            list_queue
/// GET|POST   /queue/dequeue    dequeue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(queue::list_queue))
        .route("/queue/dequeue", get(queue::dequeue).post(queue::dequeue))
}

/// Admission route, mounted at the root.
///
/// Enqueue waits while the admission queue is full, so this route is kept
/// out of the request timeout.
///
/// ```text
/// POST       /queue/enqueue    enqueue        (other methods: 405)
/// ```
pub fn admission_router() -> Router<AppState> {
    Router::new().route("/queue/enqueue", post(queue::enqueue))
}
