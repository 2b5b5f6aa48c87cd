//! Google Drive storage backend.
//!
//! Provides the Drive v3 REST client ([`api::DriveApi`]), the
//! [`DriveUploader`] that plugs into the dispatcher, and the formatting
//! used by the `upqueue-drivelist` tool.

pub mod api;
pub mod config;
pub mod listing;
pub mod uploader;

pub use api::{DriveApi, DriveApiError, DriveFile};
pub use config::DriveConfig;
pub use uploader::DriveUploader;
