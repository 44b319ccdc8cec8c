//! Transport abstraction for the engine IPC channel

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::TransportError;
use crate::wire::{EngineEvent, EngineRequest, EngineResponse, MessageId, WireEventMask};

/// Opaque identifier of an open connection to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle(pub u32);

impl fmt::Display for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Errors reported by the IPC layer outside of any request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// The remote service went away, typically because it restarted
    ServiceUnavailable,
    Other(u32),
}

/// Everything the transport delivers asynchronously
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Event(EngineEvent),
    Response(EngineResponse),
    Error(ClientErrorKind),
}

/// Sink the transport uses to deliver asynchronous traffic
pub type EventSink = mpsc::UnboundedSender<TransportEvent>;

/// Raw IPC primitive to the remote positioning service
///
/// Implementations deliver indications, responses and errors through the
/// sink handed to [`open`](LocTransport::open) and must never block while
/// doing so.
#[async_trait]
pub trait LocTransport: Send + Sync {
    /// Open a connection subscribed to `mask`
    async fn open(&self, mask: WireEventMask, sink: EventSink)
        -> Result<ClientHandle, TransportError>;

    /// Close a connection
    async fn close(&self, handle: ClientHandle) -> Result<(), TransportError>;

    /// Replace the event subscription of an open connection
    async fn register_event_mask(
        &self,
        handle: ClientHandle,
        mask: WireEventMask,
    ) -> Result<(), TransportError>;

    /// Send a request; the response, if any, arrives through the sink
    async fn send(&self, handle: ClientHandle, request: EngineRequest)
        -> Result<(), TransportError>;

    /// Check which of `ids` the service implements
    async fn supported_messages(
        &self,
        handle: ClientHandle,
        ids: &[MessageId],
    ) -> Result<Vec<bool>, TransportError>;
}
