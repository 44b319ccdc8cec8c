//! Transport error types

use loc_core::LocError;
use thiserror::Error;

/// Client status of the IPC primitive
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Client already open")]
    AlreadyOpen,

    #[error("Invalid client handle")]
    InvalidHandle,

    #[error("Request not supported by the service")]
    Unsupported,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Service busy")]
    EngineBusy,

    #[error("Phone offline")]
    PhoneOffline,

    #[error("Transport timeout")]
    Timeout,

    #[error("Location service not present")]
    ServiceNotPresent,

    #[error("Internal IPC error: {0}")]
    Internal(String),

    #[error("Transport failure: {0}")]
    General(String),

    #[error("Connection closed")]
    ConnectionClosed,
}

impl From<TransportError> for LocError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidHandle | TransportError::ConnectionClosed => {
                LocError::InvalidHandle
            }
            TransportError::Unsupported => LocError::Unsupported,
            TransportError::InvalidParameter(msg) => LocError::InvalidParameter(msg),
            TransportError::EngineBusy => LocError::EngineBusy,
            TransportError::PhoneOffline => LocError::PhoneOffline,
            TransportError::Timeout => LocError::Timeout,
            TransportError::ServiceNotPresent => LocError::ServiceNotPresent,
            TransportError::Internal(msg) => LocError::Internal(msg),
            TransportError::AlreadyOpen => LocError::failure("client already open"),
            TransportError::General(msg) => LocError::GeneralFailure(msg),
        }
    }
}
