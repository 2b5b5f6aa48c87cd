use std::collections::HashMap;

use tokio::sync::RwLock;
use upqueue_core::{Task, TaskId};

/// Waiting set of admitted tasks that have not finished yet.
///
/// Thread-safe via interior `RwLock`; shared as `Arc<Registry>` between the
/// assignment loop (inserts) and the workers (removals). Absence of an id
/// means the task was either never admitted or has completed.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `id`.
    pub async fn insert(&self, id: TaskId, task: Task) {
        self.tasks.write().await.insert(id, task);
    }

    /// Remove the entry for `id`. Removing an unknown id is a no-op.
    pub async fn remove(&self, id: &str) -> Option<Task> {
        self.tasks.write().await.remove(id)
    }

    /// Whether an entry for `id` exists.
    pub async fn contains(&self, id: &str) -> bool {
        self.tasks.read().await.contains_key(id)
    }

    /// Mark the entry for `id` as running and return a copy of it.
    ///
    /// Returns `None` if the task was removed in the meantime. The presence
    /// check and the flag update happen under one write lock.
    pub async fn claim(&self, id: &str) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(id)?;
        task.running = true;
        Some(task.clone())
    }

    /// Remove every entry, returning how many were dropped.
    pub async fn clear(&self) -> usize {
        let mut tasks = self.tasks.write().await;
        let count = tasks.len();
        tasks.clear();
        count
    }

    /// Copy out all entries, ordered by id.
    ///
    /// Ids are time-ordered, so this is close to admission order. The view
    /// is taken under a read lock but may be stale by the time it is used.
    pub async fn snapshot(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        tasks
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Whether the registry has no entries.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn admitted(id: &str, filename: &str) -> Task {
        let mut task = Task::new(filename);
        task.admit(id.to_string());
        task
    }

    #[tokio::test]
    async fn insert_then_contains() {
        let registry = Registry::new();

        registry.insert("a".into(), admitted("a", "a.txt")).await;

        assert!(registry.contains("a").await);
        assert!(!registry.contains("b").await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn insert_is_an_upsert() {
        let registry = Registry::new();

        registry.insert("a".into(), admitted("a", "old.txt")).await;
        registry.insert("a".into(), admitted("a", "new.txt")).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].filename, "new.txt");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = Registry::new();
        registry.insert("a".into(), admitted("a", "a.txt")).await;

        assert!(registry.remove("a").await.is_some());
        assert!(registry.remove("a").await.is_none());
        assert!(registry.remove("never-there").await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn claim_marks_running_only_when_present() {
        let registry = Registry::new();
        registry.insert("a".into(), admitted("a", "a.txt")).await;

        let claimed = registry.claim("a").await.expect("task should be claimable");
        assert!(claimed.running);
        assert!(registry.snapshot().await[0].running);

        registry.remove("a").await;
        assert!(registry.claim("a").await.is_none());
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let registry = Registry::new();
        for id in ["a", "b", "c"] {
            registry.insert(id.into(), admitted(id, "f")).await;
        }

        assert_eq!(registry.clear().await, 3);
        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_is_sorted_by_id() {
        let registry = Registry::new();
        for id in ["c", "a", "b"] {
            registry.insert(id.into(), admitted(id, "f")).await;
        }

        let ids: Vec<_> = registry.snapshot().await.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn concurrent_inserts_are_all_visible() {
        let registry = Arc::new(Registry::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let id = format!("task-{i:02}");
                    registry.insert(id.clone(), admitted(&id, "f")).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len().await, 64);
    }
}
