//! Domain types shared by the upqueue crates.
//!
//! - [`task::Task`]: an upload job and its lifecycle fields.
//! - [`types`]: identity aliases and the task id generator.
//! - [`mime`]: content type inference from file extensions.
//! - [`error::CoreError`]: domain-level error type.

pub mod error;
pub mod mime;
pub mod task;
pub mod types;

pub use error::CoreError;
pub use task::Task;
pub use types::TaskId;
