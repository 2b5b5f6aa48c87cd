use std::sync::Arc;

use upqueue_worker::Dispatcher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Upload dispatcher the control surface drives.
    pub dispatcher: Dispatcher,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
