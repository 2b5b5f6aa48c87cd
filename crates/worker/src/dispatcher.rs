//! Task dispatcher.
//!
//! Admission goes through a bounded queue. A single assignment loop drains
//! it: each task gets an id, is placed in the [`Registry`], and then a
//! short-lived helper waits for an idle worker on its behalf. Waiting for a
//! worker never blocks intake of the next queued task, so assignment order
//! is not guaranteed to follow admission order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use upqueue_core::types::new_task_id;
use upqueue_core::{Task, TaskId};

use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::in_flight::InFlight;
use crate::registry::Registry;
use crate::uploader::Uploader;
use crate::worker::{IdleSlot, Worker};

/// Bounded worker pool plus admission queue.
///
/// Cheaply cloneable; clones share the same pool, queue and registry.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    config: DispatcherConfig,
    workers: Vec<Worker>,
    queue_tx: mpsc::Sender<Task>,
    // Held by the assignment loop for its whole lifetime.
    queue_rx: Mutex<mpsc::Receiver<Task>>,
    idle_rx: Mutex<mpsc::Receiver<IdleSlot>>,
    registry: Arc<Registry>,
    in_flight: Arc<InFlight>,
    quit: CancellationToken,
    started: AtomicBool,
}

impl Dispatcher {
    /// Build the dispatcher and its workers. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(config: DispatcherConfig, uploader: Arc<dyn Uploader>) -> Self {
        let config = DispatcherConfig::new(config.pool_size, config.queue_capacity);
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
        let (idle_tx, idle_rx) = mpsc::channel(config.pool_size);
        let registry = Arc::new(Registry::new());
        let in_flight = Arc::new(InFlight::new());
        let quit = CancellationToken::new();

        let workers = (0..config.pool_size)
            .map(|index| {
                Worker::new(
                    index,
                    idle_tx.clone(),
                    Arc::clone(&registry),
                    Arc::clone(&in_flight),
                    Arc::clone(&uploader),
                    quit.clone(),
                )
            })
            .collect();

        Self {
            inner: Arc::new(Inner {
                config,
                workers,
                queue_tx,
                queue_rx: Mutex::new(queue_rx),
                idle_rx: Mutex::new(idle_rx),
                registry,
                in_flight,
                quit,
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> DispatcherConfig {
        self.inner.config
    }

    /// Start the workers, then the assignment loop.
    ///
    /// Must be called from within a Tokio runtime. The returned handle
    /// completes after [`quit`](Self::quit).
    pub fn start(&self) -> Result<JoinHandle<()>, DispatchError> {
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DispatchError::AlreadyStarted);
        }

        for worker in &self.inner.workers {
            worker.clone().start();
        }

        Ok(tokio::spawn(run_assignment_loop(Arc::clone(&self.inner))))
    }

    /// Admit a task for future execution.
    ///
    /// The in-flight counter is incremented before the task is handed to the
    /// queue, so a concurrent [`wait`](Self::wait) cannot miss it. Waits
    /// while the queue is full. Any `id` or `running` value supplied by the
    /// caller is replaced on admission.
    pub async fn enqueue(&self, task: Task) {
        let admission = self.inner.in_flight.admit();

        match self.inner.queue_tx.send(task).await {
            Ok(()) => admission.commit(),
            Err(mpsc::error::SendError(task)) => {
                // The receiver lives as long as `inner`; kept for completeness.
                tracing::error!(filename = %task.filename, "Admission queue closed, task dropped");
            }
        }
    }

    /// Wait until every admitted task has completed, failed, or been
    /// skipped.
    pub async fn wait(&self) {
        self.inner.in_flight.wait().await;
    }

    /// Stop the assignment loop and any idle workers.
    ///
    /// Uploads already in progress run to completion. Tasks still queued or
    /// waiting for a worker are left as they are.
    pub fn quit(&self) {
        tracing::info!("Dispatcher quit requested");
        self.inner.quit.cancel();
    }

    /// Number of admitted tasks that have not settled yet.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.count()
    }

    /// Shared handle to the waiting set.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    /// Current waiting set, ordered by id.
    pub async fn snapshot(&self) -> Vec<Task> {
        self.inner.registry.snapshot().await
    }

    /// Drop the bookkeeping entry for one task.
    ///
    /// A task removed before a worker claims it is skipped. A task that is
    /// already executing keeps running; only its entry disappears.
    pub async fn dequeue(&self, id: &str) -> bool {
        let removed = self.inner.registry.remove(id).await.is_some();
        tracing::info!(task_id = %id, removed, "Dequeue requested");
        removed
    }

    /// Drop every bookkeeping entry. Returns how many were removed.
    pub async fn dequeue_all(&self) -> usize {
        let count = self.inner.registry.clear().await;
        tracing::info!(count, "Cleared waiting set");
        count
    }
}

async fn run_assignment_loop(inner: Arc<Inner>) {
    let mut queue = inner.queue_rx.lock().await;
    tracing::info!(
        workers = inner.config.pool_size,
        queue_capacity = inner.config.queue_capacity,
        "Dispatcher started",
    );

    loop {
        tokio::select! {
            _ = inner.quit.cancelled() => {
                tracing::info!("Dispatcher shutting down");
                break;
            }
            received = queue.recv() => {
                let Some(mut task) = received else {
                    break;
                };

                let id = new_task_id();
                task.admit(id.clone());
                inner.registry.insert(id.clone(), task).await;
                tracing::info!(task_id = %id, "Task waiting");

                tokio::spawn(assign(Arc::clone(&inner), id));
            }
        }
    }
}

/// Wait for an idle worker and hand it the task, unless the task was
/// removed from the registry in the meantime.
async fn assign(inner: Arc<Inner>, id: TaskId) {
    let slot = tokio::select! {
        _ = inner.quit.cancelled() => return,
        slot = async { inner.idle_rx.lock().await.recv().await } => slot,
    };

    let Some(slot) = slot else {
        tracing::error!(task_id = %id, "Idle pool closed, task dropped");
        inner.registry.remove(&id).await;
        inner.in_flight.done();
        return;
    };

    match inner.registry.claim(&id).await {
        Some(task) => {
            if let Err(task) = slot.send(task) {
                tracing::warn!(task_id = %task.id, "Worker stopped before accepting task");
                inner.registry.remove(&task.id).await;
                inner.in_flight.done();
            }
        }
        None => {
            // Dropping the slot releases the worker back to the pool.
            tracing::debug!(task_id = %id, "Task removed before assignment, skipping");
            drop(slot);
            inner.in_flight.done();
        }
    }
}
