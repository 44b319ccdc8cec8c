//! Handle lifecycle on top of the raw transport

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{ClientHandle, EventSink, LocTransport, TransportError};
use crate::wire::{EngineRequest, MessageId, WireEventMask};

/// Owns the single connection handle of an adapter instance
pub struct TransportClient {
    transport: Arc<dyn LocTransport>,
    handle: Option<ClientHandle>,
}

impl TransportClient {
    pub fn new(transport: Arc<dyn LocTransport>) -> Self {
        Self {
            transport,
            handle: None,
        }
    }

    pub fn handle(&self) -> Option<ClientHandle> {
        self.handle
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Handle of the open connection, or `InvalidHandle`
    pub fn require_handle(&self) -> Result<ClientHandle, TransportError> {
        self.handle.ok_or(TransportError::InvalidHandle)
    }

    /// Open the connection. Fails with `AlreadyOpen` if a handle is held.
    pub async fn open(
        &mut self,
        mask: WireEventMask,
        sink: EventSink,
    ) -> Result<ClientHandle, TransportError> {
        if let Some(handle) = self.handle {
            warn!(%handle, "Open requested while already open");
            return Err(TransportError::AlreadyOpen);
        }

        let handle = self.transport.open(mask, sink).await?;
        info!(%handle, mask = ?mask, "Location client opened");
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Close the connection. Closing without a handle is a no-op success.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        let Some(handle) = self.handle.take() else {
            debug!("Close requested without an open handle");
            return Ok(());
        };

        info!(%handle, "Closing location client");
        self.transport.close(handle).await
    }

    pub async fn register_event_mask(&self, mask: WireEventMask) -> Result<(), TransportError> {
        let handle = self.require_handle()?;
        debug!(%handle, mask = ?mask, "Registering event mask");
        self.transport.register_event_mask(handle, mask).await
    }

    /// Fire-and-forget send
    pub async fn send(&self, request: EngineRequest) -> Result<(), TransportError> {
        let handle = self.require_handle()?;
        self.transport.send(handle, request).await
    }

    pub async fn supported_messages(&self, ids: &[MessageId]) -> Result<Vec<bool>, TransportError> {
        let handle = self.require_handle()?;
        self.transport.supported_messages(handle, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockEngine;
    use tokio::sync::mpsc;

    fn client() -> (TransportClient, Arc<MockEngine>) {
        let engine = Arc::new(MockEngine::new());
        (TransportClient::new(engine.clone()), engine)
    }

    #[tokio::test]
    async fn test_open_twice_fails() {
        let (mut client, _engine) = client();
        let (tx, _rx) = mpsc::unbounded_channel();

        client.open(WireEventMask::empty(), tx.clone()).await.unwrap();
        let err = client.open(WireEventMask::empty(), tx).await.unwrap_err();
        assert_eq!(err, TransportError::AlreadyOpen);
    }

    #[tokio::test]
    async fn test_double_close_is_noop() {
        let (mut client, engine) = client();
        let (tx, _rx) = mpsc::unbounded_channel();

        client.open(WireEventMask::empty(), tx).await.unwrap();
        client.close().await.unwrap();
        client.close().await.unwrap();
        assert_eq!(engine.close_count(), 1);
        assert!(!client.is_open());
    }

    #[tokio::test]
    async fn test_send_without_handle() {
        let (client, engine) = client();
        let err = client
            .send(EngineRequest::GetEngineLock)
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::InvalidHandle);
        assert!(engine.sent_requests().is_empty());
    }
}
