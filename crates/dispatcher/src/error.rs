//! Dispatcher error types

use thiserror::Error;

/// Errors from settling a `DeferredResult`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettleError {
    /// The deferred was already settled; continuations are not re-invoked
    #[error("deferred result already settled")]
    AlreadySettled,
}
