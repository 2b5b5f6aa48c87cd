//! Handlers for the upload queue.
//!
//! The queue endpoints report the dispatcher's waiting set: tasks that have
//! been admitted and not yet finished. Enqueue is fire-and-forget; callers
//! are never told how an upload eventually turned out.

use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::Deserialize;
use upqueue_core::Task;

use crate::error::AppResult;
use crate::response::{PrettyJson, QueueResponse};
use crate::state::AppState;

/// Query parameters for `/queue/dequeue`.
#[derive(Debug, Default, Deserialize)]
pub struct DequeueParams {
    /// Remove only this task. Without it the whole waiting set is cleared.
    pub id: Option<String>,
}

async fn queue_snapshot(state: &AppState) -> PrettyJson<QueueResponse> {
    PrettyJson(QueueResponse {
        tasks: state.dispatcher.snapshot().await,
    })
}

/// GET /queue
pub async fn list_queue(State(state): State<AppState>) -> PrettyJson<QueueResponse> {
    queue_snapshot(&state).await
}

/// POST /queue/enqueue
///
/// Decode a task from the body and admit it. Waits while the admission
/// queue is full. The returned snapshot may not include the new task yet,
/// since ids are assigned by the dispatcher loop.
pub async fn enqueue(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<PrettyJson<QueueResponse>> {
    let task: Task = serde_json::from_slice(&body)?;

    tracing::info!(filename = %task.filename, parents = ?task.parents, "Enqueue requested");
    state.dispatcher.enqueue(task).await;

    Ok(queue_snapshot(&state).await)
}

/// GET|POST /queue/dequeue[?id=<task id>]
///
/// Administrative override: drops bookkeeping entries. Uploads already
/// running are not interrupted.
pub async fn dequeue(
    State(state): State<AppState>,
    Query(params): Query<DequeueParams>,
) -> PrettyJson<QueueResponse> {
    match params.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            state.dispatcher.dequeue(id).await;
        }
        None => {
            state.dispatcher.dequeue_all().await;
        }
    }

    queue_snapshot(&state).await
}
