use uuid::Uuid;

/// Dispatcher-assigned task identity. Empty until the task is admitted.
pub type TaskId = String;

/// Generate a fresh task identity.
///
/// UUID v7 is time-ordered with a random tail, so ids are unique for the
/// life of the process and sort roughly in admission order.
pub fn new_task_id() -> TaskId {
    Uuid::now_v7().simple().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_ids_are_non_empty_and_distinct() {
        let ids: HashSet<TaskId> = (0..1000).map(|_| new_task_id()).collect();

        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| !id.is_empty()));
    }
}
