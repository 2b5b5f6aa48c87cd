/// Worker pool size used when none (or zero) is configured.
pub const DEFAULT_POOL_SIZE: usize = 1;

/// Admission queue capacity used when none (or zero) is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Sizing for a [`Dispatcher`](crate::Dispatcher).
///
/// Passed by value into the constructor; nothing about it can change once
/// the dispatcher exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Number of workers, i.e. the maximum number of concurrent uploads.
    pub pool_size: usize,
    /// Capacity of the admission queue. `enqueue` waits once it is full.
    pub queue_capacity: usize,
}

impl DispatcherConfig {
    /// Build a config, replacing zero values with the defaults.
    pub fn new(pool_size: usize, queue_capacity: usize) -> Self {
        Self {
            pool_size: if pool_size == 0 {
                DEFAULT_POOL_SIZE
            } else {
                pool_size
            },
            queue_capacity: if queue_capacity == 0 {
                DEFAULT_QUEUE_CAPACITY
            } else {
                queue_capacity
            },
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY)
    }
}
