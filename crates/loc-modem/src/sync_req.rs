//! Synchronous request protocol
//!
//! A synchronous request registers a wait for its response id, sends the
//! request and waits a bounded time for the dispatcher to hand over the
//! matching response. Responses that find no waiter are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loc_core::{LocError, LocResult};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::transport::{ClientHandle, LocTransport};
use crate::wire::{EngineRequest, EngineResponse, MessageId};

struct PendingWait {
    token: u64,
    expected: MessageId,
    tx: oneshot::Sender<EngineResponse>,
}

/// Outstanding synchronous waits, shared with the event dispatcher
#[derive(Default)]
pub struct SyncRequestTable {
    pending: Mutex<Vec<PendingWait>>,
    next_token: AtomicU64,
}

impl SyncRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a wait for `expected`
    pub fn register(&self, expected: MessageId) -> (u64, oneshot::Receiver<EngineResponse>) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push(PendingWait {
            token,
            expected,
            tx,
        });
        (token, rx)
    }

    /// Remove a wait that timed out or whose send failed
    pub fn cancel(&self, token: u64) {
        self.pending.lock().retain(|w| w.token != token);
    }

    /// Hand a response to the oldest wait expecting its id.
    ///
    /// Matching is by message id only: the engine echoes no request token, so
    /// a late response can satisfy a newer wait for the same id.
    ///
    /// Returns `false` when no wait matches and the response was discarded.
    pub fn complete(&self, response: EngineResponse) -> bool {
        let wait = {
            let mut pending = self.pending.lock();
            match pending.iter().position(|w| w.expected == response.id) {
                Some(index) => pending.remove(index),
                None => {
                    debug!(id = ?response.id, "Discarding response with no outstanding wait");
                    return false;
                }
            }
        };

        if wait.tx.send(response).is_err() {
            debug!(token = wait.token, "Waiter gone before response delivery");
            return false;
        }
        true
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Sends requests and waits for their response indication
#[derive(Clone)]
pub struct SyncClient {
    transport: Arc<dyn LocTransport>,
    table: Arc<SyncRequestTable>,
    timeout: Duration,
}

impl SyncClient {
    pub fn new(
        transport: Arc<dyn LocTransport>,
        table: Arc<SyncRequestTable>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            table,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` and wait up to the default timeout for its response
    pub async fn request(
        &self,
        handle: ClientHandle,
        request: EngineRequest,
    ) -> LocResult<EngineResponse> {
        let expected = request.id();
        self.send_sync(handle, request, expected, self.timeout).await
    }

    /// Send `request` and wait up to `timeout` for a response with id
    /// `expected`. A non-success response status fails the call.
    pub async fn send_sync(
        &self,
        handle: ClientHandle,
        request: EngineRequest,
        expected: MessageId,
        timeout: Duration,
    ) -> LocResult<EngineResponse> {
        let id = request.id();
        let (token, rx) = self.table.register(expected);

        if let Err(e) = self.transport.send(handle, request).await {
            self.table.cancel(token);
            warn!(?id, error = %e, "Failed to send request");
            return Err(e.into());
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => {
                if let Err(e) = response.status.into_result() {
                    debug!(?id, status = ?response.status, "Request rejected by engine");
                    return Err(e);
                }
                Ok(response)
            }
            Ok(Err(_)) => {
                self.table.cancel(token);
                Err(LocError::Internal("response channel closed".to_string()))
            }
            Err(_) => {
                self.table.cancel(token);
                warn!(?id, timeout_ms = timeout.as_millis() as u64, "Request timed out");
                Err(LocError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockEngine, MockReply, TransportEvent};
    use crate::wire::{IndicationStatus, WireEventMask};
    use tokio::sync::mpsc;

    /// Sync client wired to a mock engine with a minimal dispatcher
    async fn setup(timeout_ms: u64) -> (SyncClient, Arc<MockEngine>, Arc<SyncRequestTable>, ClientHandle) {
        let engine = Arc::new(MockEngine::new());
        let table = Arc::new(SyncRequestTable::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = engine.open(WireEventMask::empty(), tx).await.unwrap();

        let dispatch_table = table.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let TransportEvent::Response(resp) = event {
                    dispatch_table.complete(resp);
                }
            }
        });

        let client = SyncClient::new(engine.clone(), table.clone(), Duration::from_millis(timeout_ms));
        (client, engine, table, handle)
    }

    #[test]
    fn test_unmatched_response_discarded() {
        let table = SyncRequestTable::new();
        let (_token, _rx) = table.register(MessageId::SetServer);
        assert!(!table.complete(EngineResponse::success(MessageId::SetNmeaTypes)));
        assert_eq!(table.pending_count(), 1);
    }

    #[test]
    fn test_cancelled_wait_does_not_match() {
        let table = SyncRequestTable::new();
        let (token, _rx) = table.register(MessageId::SetServer);
        table.cancel(token);
        assert!(!table.complete(EngineResponse::success(MessageId::SetServer)));
    }

    #[tokio::test]
    async fn test_request_success() {
        let (client, _engine, table, handle) = setup(200).await;
        let resp = client.request(handle, EngineRequest::GetEngineLock).await.unwrap();
        assert_eq!(resp.id, MessageId::GetEngineLock);
        assert_eq!(table.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_status_is_error() {
        let (client, engine, _table, handle) = setup(200).await;
        engine.reply_once(
            MessageId::GetEngineLock,
            MockReply::Respond(EngineResponse::with_status(
                MessageId::GetEngineLock,
                IndicationStatus::PhoneOffline,
            )),
        );
        let err = client.request(handle, EngineRequest::GetEngineLock).await.unwrap_err();
        assert_eq!(err, LocError::PhoneOffline);
    }

    #[tokio::test]
    async fn test_send_rejection_clears_wait() {
        let (client, engine, table, handle) = setup(200).await;
        engine.reply_once(
            MessageId::GetEngineLock,
            MockReply::Reject(crate::transport::TransportError::Unsupported),
        );
        let err = client.request(handle, EngineRequest::GetEngineLock).await.unwrap_err();
        assert_eq!(err, LocError::Unsupported);
        assert_eq!(table.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_late_response_does_not_leak_into_next_request() {
        let (client, engine, table, handle) = setup(50).await;

        // First request answers only after its wait has expired
        engine.reply_once(
            MessageId::GetEngineLock,
            MockReply::Delayed(
                Duration::from_millis(150),
                EngineResponse::with_status(MessageId::GetEngineLock, IndicationStatus::EngineBusy),
            ),
        );
        let err = client.request(handle, EngineRequest::GetEngineLock).await.unwrap_err();
        assert_eq!(err, LocError::Timeout);
        assert_eq!(table.pending_count(), 0);

        // An unrelated request is waiting when the late response lands
        engine.reply_once(
            MessageId::SetNmeaTypes,
            MockReply::Delayed(
                Duration::from_millis(180),
                EngineResponse::success(MessageId::SetNmeaTypes),
            ),
        );
        let client2 = client.clone();
        let resp = client2
            .send_sync(
                handle,
                EngineRequest::SetNmeaTypes(loc_core::NmeaTypes::GGA),
                MessageId::SetNmeaTypes,
                Duration::from_millis(500),
            )
            .await
            .unwrap();
        assert_eq!(resp.id, MessageId::SetNmeaTypes);
        assert_eq!(resp.status, IndicationStatus::Success);
        assert_eq!(table.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_response_times_out() {
        let (client, engine, table, handle) = setup(30).await;
        engine.set_reply(MessageId::SetServer, MockReply::NoResponse);
        let req = EngineRequest::SetServer(crate::wire::SetServerRequest {
            server_type: crate::wire::ServerType::UmtsSlp,
            ipv4: None,
            url: Some("supl.example.com:7275".to_string()),
        });
        assert_eq!(client.request(handle, req).await.unwrap_err(), LocError::Timeout);
        assert_eq!(table.pending_count(), 0);
    }
}
