use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use upqueue_core::Task;

use crate::in_flight::InFlight;
use crate::registry::Registry;
use crate::uploader::Uploader;

/// Single-use handoff a worker places in the idle pool while it waits.
///
/// Dropping the sender without sending releases the worker, which then
/// re-advertises itself.
pub(crate) type IdleSlot = oneshot::Sender<Task>;

/// One member of the fixed worker pool.
///
/// Cheap to clone: every field is a shared handle.
#[derive(Clone)]
pub(crate) struct Worker {
    index: usize,
    idle: mpsc::Sender<IdleSlot>,
    registry: Arc<Registry>,
    in_flight: Arc<InFlight>,
    uploader: Arc<dyn Uploader>,
    quit: CancellationToken,
}

impl Worker {
    pub(crate) fn new(
        index: usize,
        idle: mpsc::Sender<IdleSlot>,
        registry: Arc<Registry>,
        in_flight: Arc<InFlight>,
        uploader: Arc<dyn Uploader>,
        quit: CancellationToken,
    ) -> Self {
        Self {
            index,
            idle,
            registry,
            in_flight,
            uploader,
            quit,
        }
    }

    pub(crate) fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Idle -> Executing -> Idle until quit is signalled while idle.
    async fn run(self) {
        tracing::debug!(worker = self.index, "Worker started");

        loop {
            let (slot, mut assigned) = oneshot::channel();

            tokio::select! {
                _ = self.quit.cancelled() => break,
                sent = self.idle.send(slot) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }

            let task = tokio::select! {
                biased;
                task = &mut assigned => match task {
                    Ok(task) => task,
                    // Slot released without a task.
                    Err(_) => continue,
                },
                _ = self.quit.cancelled() => {
                    // A helper may have handed over a task just before quit.
                    assigned.close();
                    if let Ok(task) = assigned.try_recv() {
                        self.execute(task).await;
                    }
                    break;
                }
            };

            self.execute(task).await;
        }

        tracing::debug!(worker = self.index, "Worker stopped");
    }

    async fn execute(&self, task: Task) {
        tracing::info!(
            worker = self.index,
            task_id = %task.id,
            filename = %task.filename,
            "Task claimed by worker",
        );

        let outcome = AssertUnwindSafe(self.uploader.upload(&task))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(remote_id)) => {
                tracing::info!(
                    worker = self.index,
                    task_id = %task.id,
                    remote_id = %remote_id,
                    "Task completed",
                );
            }
            Ok(Err(e)) => {
                tracing::error!(
                    worker = self.index,
                    task_id = %task.id,
                    error = %e,
                    "Task failed",
                );
            }
            Err(_) => {
                tracing::error!(
                    worker = self.index,
                    task_id = %task.id,
                    "Uploader panicked",
                );
            }
        }

        self.registry.remove(&task.id).await;
        self.in_flight.done();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::uploader::UploadError;

    struct Echo;

    #[async_trait]
    impl Uploader for Echo {
        async fn upload(&self, task: &Task) -> Result<String, UploadError> {
            Ok(format!("remote-{}", task.id))
        }
    }

    #[tokio::test]
    async fn task_handed_over_as_quit_fires_still_runs() {
        let (idle_tx, mut idle_rx) = mpsc::channel(1);
        let registry = Arc::new(Registry::new());
        let in_flight = Arc::new(InFlight::new());
        let quit = CancellationToken::new();
        let handle = Worker::new(
            0,
            idle_tx,
            Arc::clone(&registry),
            Arc::clone(&in_flight),
            Arc::new(Echo),
            quit.clone(),
        )
        .start();

        let slot = idle_rx.recv().await.unwrap();
        let mut task = Task::new("late.txt");
        task.admit("late".into());
        registry.insert("late".into(), task.clone()).await;
        in_flight.add();

        quit.cancel();
        slot.send(task).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop after quit")
            .unwrap();
        assert_eq!(in_flight.count(), 0);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn idle_worker_stops_on_quit() {
        let (idle_tx, mut idle_rx) = mpsc::channel(1);
        let quit = CancellationToken::new();
        let handle = Worker::new(
            0,
            idle_tx,
            Arc::new(Registry::new()),
            Arc::new(InFlight::new()),
            Arc::new(Echo),
            quit.clone(),
        )
        .start();

        let slot = idle_rx.recv().await.unwrap();
        quit.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop after quit")
            .unwrap();
        assert!(slot.is_closed());
    }
}
