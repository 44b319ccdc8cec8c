//! Error taxonomy for adapter operations

use thiserror::Error;

/// Result type for adapter operations. `Ok` is the success outcome.
pub type LocResult<T> = Result<T, LocError>;

/// Failure outcomes of an adapter operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocError {
    /// Generic failure reported by the engine or the adapter
    #[error("General failure: {0}")]
    GeneralFailure(String),

    /// The engine does not support the request
    #[error("Request not supported by the engine")]
    Unsupported,

    /// A parameter was rejected
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The engine is busy with another request
    #[error("Engine busy")]
    EngineBusy,

    /// The modem is offline
    #[error("Phone offline")]
    PhoneOffline,

    /// No matching response arrived in time
    #[error("Operation timed out")]
    Timeout,

    /// No open connection to the engine
    #[error("Invalid handle")]
    InvalidHandle,

    /// The remote positioning service is not present
    #[error("Service not present")]
    ServiceNotPresent,

    /// Internal error in the adapter or the IPC layer
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LocError {
    /// Convenience constructor for general failures
    pub fn failure(msg: impl Into<String>) -> Self {
        LocError::GeneralFailure(msg.into())
    }

    /// Convenience constructor for invalid parameters
    pub fn invalid(msg: impl Into<String>) -> Self {
        LocError::InvalidParameter(msg.into())
    }

    /// Whether a newer request generation should fall back to an older one
    /// after this error.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, LocError::Unsupported | LocError::Internal(_))
    }
}
