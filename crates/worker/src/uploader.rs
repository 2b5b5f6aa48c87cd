use async_trait::async_trait;
use upqueue_core::{CoreError, Task};

/// Errors an [`Uploader`] can report. Workers log these and move on.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The task itself is unusable (e.g. no file name).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The local file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The storage backend rejected or failed the write.
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Storage backend that performs the actual write for a task.
///
/// Implementations must return (success or error) in bounded time; a
/// worker is occupied for the whole call.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload the file described by `task`, returning the remote object id.
    async fn upload(&self, task: &Task) -> Result<String, UploadError>;
}
