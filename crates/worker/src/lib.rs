//! Upload dispatch engine.
//!
//! A [`Dispatcher`] owns a fixed pool of workers, a bounded admission
//! queue, and the [`Registry`] of admitted-but-unfinished tasks. Tasks are
//! executed through an [`Uploader`] implementation supplied at construction.
//!
//! - [`config`]: pool size and queue capacity.
//! - [`dispatcher`]: admission, assignment loop, drain barrier.
//! - [`registry`]: concurrency-safe waiting set.
//! - [`in_flight`]: admitted-task counter behind [`Dispatcher::wait`].
//! - [`uploader`]: the storage backend seam.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod in_flight;
pub mod registry;
pub mod uploader;
mod worker;

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use registry::Registry;
pub use uploader::{UploadError, Uploader};
