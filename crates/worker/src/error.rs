/// Errors from dispatcher lifecycle calls.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// [`Dispatcher::start`](crate::Dispatcher::start) was called more than once.
    #[error("Dispatcher already started")]
    AlreadyStarted,
}
