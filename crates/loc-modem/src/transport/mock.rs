//! Mock location engine for testing

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::{ClientErrorKind, ClientHandle, EventSink, LocTransport, TransportError, TransportEvent};
use crate::wire::{
    AonCapability, EngineEvent, EngineLock, EngineRequest, EngineResponse, MessageId,
    ResponsePayload, WireEventMask, ZppPosition,
};

/// How the mock engine answers a request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Deliver this response right away
    Respond(EngineResponse),
    /// Deliver this response after a delay
    Delayed(Duration, EngineResponse),
    /// Accept the request and never answer
    NoResponse,
    /// Reject the request at send time
    Reject(TransportError),
}

/// Mock engine implementing [`LocTransport`]
///
/// Replies are chosen from one-shot replies queued for a message id, then a
/// persistent rule for that id, then a default success reply.
pub struct MockEngine {
    next_handle: AtomicU32,
    open_handle: Mutex<Option<ClientHandle>>,
    sink: Mutex<Option<EventSink>>,
    fail_open: AtomicBool,
    once: Mutex<HashMap<MessageId, VecDeque<MockReply>>>,
    rules: RwLock<HashMap<MessageId, MockReply>>,
    unsupported: RwLock<HashSet<MessageId>>,
    sent: Mutex<Vec<EngineRequest>>,
    masks: Mutex<Vec<WireEventMask>>,
    open_count: AtomicUsize,
    close_count: AtomicUsize,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU32::new(1),
            open_handle: Mutex::new(None),
            sink: Mutex::new(None),
            fail_open: AtomicBool::new(false),
            once: Mutex::new(HashMap::new()),
            rules: RwLock::new(HashMap::new()),
            unsupported: RwLock::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            masks: Mutex::new(Vec::new()),
            open_count: AtomicUsize::new(0),
            close_count: AtomicUsize::new(0),
        }
    }

    /// Queue a reply used for the next request with `id`
    pub fn reply_once(&self, id: MessageId, reply: MockReply) {
        self.once.lock().entry(id).or_default().push_back(reply);
    }

    /// Reply to every request with `id` this way
    pub fn set_reply(&self, id: MessageId, reply: MockReply) {
        self.rules.write().insert(id, reply);
    }

    /// Mark an optional message as (un)supported by the service
    pub fn set_message_supported(&self, id: MessageId, supported: bool) {
        let mut unsupported = self.unsupported.write();
        if supported {
            unsupported.remove(&id);
        } else {
            unsupported.insert(id);
        }
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Deliver an event indication as if the engine sent it
    pub fn inject_event(&self, event: EngineEvent) {
        self.deliver(TransportEvent::Event(event));
    }

    /// Deliver a raw response indication
    pub fn inject_response(&self, response: EngineResponse) {
        self.deliver(TransportEvent::Response(response));
    }

    /// Deliver a client error as if the IPC layer reported it
    pub fn inject_error(&self, kind: ClientErrorKind) {
        self.deliver(TransportEvent::Error(kind));
    }

    pub fn sent_requests(&self) -> Vec<EngineRequest> {
        self.sent.lock().clone()
    }

    pub fn sent_ids(&self) -> Vec<MessageId> {
        self.sent.lock().iter().map(EngineRequest::id).collect()
    }

    pub fn count_sent(&self, id: MessageId) -> usize {
        self.sent.lock().iter().filter(|r| r.id() == id).count()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().clear();
    }

    /// Every mask passed to `open` or `register_event_mask`, in order
    pub fn registered_masks(&self) -> Vec<WireEventMask> {
        self.masks.lock().clone()
    }

    pub fn last_registered_mask(&self) -> Option<WireEventMask> {
        self.masks.lock().last().copied()
    }

    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.open_handle.lock().is_some()
    }

    fn deliver(&self, event: TransportEvent) {
        if let Some(sink) = self.sink.lock().as_ref() {
            let _ = sink.send(event);
        }
    }

    fn check_handle(&self, handle: ClientHandle) -> Result<(), TransportError> {
        if *self.open_handle.lock() == Some(handle) {
            Ok(())
        } else {
            Err(TransportError::InvalidHandle)
        }
    }

    fn next_reply(&self, request: &EngineRequest) -> MockReply {
        let id = request.id();
        if let Some(reply) = self.once.lock().get_mut(&id).and_then(VecDeque::pop_front) {
            return reply;
        }
        if let Some(reply) = self.rules.read().get(&id) {
            return reply.clone();
        }
        Self::default_reply(request)
    }

    fn default_reply(request: &EngineRequest) -> MockReply {
        let id = request.id();
        let payload = match request {
            // Start and stop have no response indication
            EngineRequest::Start(_) | EngineRequest::Stop { .. } => return MockReply::NoResponse,
            EngineRequest::InjectPredictedOrbitsData(part) => ResponsePayload::PredictedOrbitsPart {
                part_num: part.part_num,
            },
            EngineRequest::GetPredictedOrbitsDataSource => ResponsePayload::PredictedOrbitsSource {
                server_list: vec![
                    "https://xtra1.example.net/xtra3grc.bin".to_string(),
                    "https://xtra2.example.net/xtra3grc.bin".to_string(),
                ],
            },
            EngineRequest::GetEngineLock => ResponsePayload::EngineLock(Some(EngineLock::None)),
            EngineRequest::GetSupportedFeature => ResponsePayload::SupportedFeature(vec![0x01]),
            EngineRequest::QueryAonConfig { .. } => ResponsePayload::AonConfig(Some(
                AonCapability::TIME_BASED_BATCHING | AonCapability::UPDATE_TBF_ON_THE_FLY,
            )),
            EngineRequest::GetAvailableWwanPosition { .. }
            | EngineRequest::GetBestAvailablePosition { .. } => {
                ResponsePayload::ZppPosition(ZppPosition {
                    latitude: Some(37.4220),
                    longitude: Some(-122.0841),
                    hor_unc_circular: Some(1500.0),
                    hor_circular_confidence: Some(68),
                    technology_mask: Some(0x0002),
                    timestamp_utc: Some(1_700_000_000_000),
                    ..Default::default()
                })
            }
            _ => ResponsePayload::None,
        };
        MockReply::Respond(EngineResponse::success(id).with_payload(payload))
    }
}

#[async_trait]
impl LocTransport for MockEngine {
    async fn open(
        &self,
        mask: WireEventMask,
        sink: EventSink,
    ) -> Result<ClientHandle, TransportError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(TransportError::ServiceNotPresent);
        }

        let handle = ClientHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        *self.open_handle.lock() = Some(handle);
        *self.sink.lock() = Some(sink);
        self.masks.lock().push(mask);
        self.open_count.fetch_add(1, Ordering::SeqCst);
        debug!(%handle, ?mask, "Mock engine: opened");
        Ok(handle)
    }

    async fn close(&self, handle: ClientHandle) -> Result<(), TransportError> {
        let mut open = self.open_handle.lock();
        self.close_count.fetch_add(1, Ordering::SeqCst);
        if *open != Some(handle) {
            return Err(TransportError::InvalidHandle);
        }
        *open = None;
        debug!(%handle, "Mock engine: closed");
        Ok(())
    }

    async fn register_event_mask(
        &self,
        handle: ClientHandle,
        mask: WireEventMask,
    ) -> Result<(), TransportError> {
        self.check_handle(handle)?;
        self.masks.lock().push(mask);
        Ok(())
    }

    async fn send(
        &self,
        handle: ClientHandle,
        request: EngineRequest,
    ) -> Result<(), TransportError> {
        self.check_handle(handle)?;
        debug!(id = ?request.id(), "Mock engine: received request");

        let reply = self.next_reply(&request);
        self.sent.lock().push(request);

        match reply {
            MockReply::Respond(response) => {
                self.deliver(TransportEvent::Response(response));
                Ok(())
            }
            MockReply::Delayed(delay, response) => {
                let sink = self.sink.lock().clone();
                if let Some(sink) = sink {
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = sink.send(TransportEvent::Response(response));
                    });
                }
                Ok(())
            }
            MockReply::NoResponse => Ok(()),
            MockReply::Reject(err) => Err(err),
        }
    }

    async fn supported_messages(
        &self,
        handle: ClientHandle,
        ids: &[MessageId],
    ) -> Result<Vec<bool>, TransportError> {
        self.check_handle(handle)?;
        let unsupported = self.unsupported.read();
        Ok(ids.iter().map(|id| !unsupported.contains(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::IndicationStatus;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_default_reply_is_success() {
        let engine = MockEngine::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = engine.open(WireEventMask::empty(), tx).await.unwrap();

        engine.send(handle, EngineRequest::GetEngineLock).await.unwrap();

        match rx.recv().await {
            Some(TransportEvent::Response(resp)) => {
                assert_eq!(resp.id, MessageId::GetEngineLock);
                assert_eq!(resp.status, IndicationStatus::Success);
            }
            other => panic!("Expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_shot_reply_precedes_rule() {
        let engine = MockEngine::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = engine.open(WireEventMask::empty(), tx).await.unwrap();

        engine.set_reply(
            MessageId::SetNmeaTypes,
            MockReply::Respond(EngineResponse::with_status(
                MessageId::SetNmeaTypes,
                IndicationStatus::EngineBusy,
            )),
        );
        engine.reply_once(MessageId::SetNmeaTypes, MockReply::NoResponse);

        let req = EngineRequest::SetNmeaTypes(loc_core::NmeaTypes::GGA);
        engine.send(handle, req.clone()).await.unwrap();
        engine.send(handle, req).await.unwrap();

        match rx.recv().await {
            Some(TransportEvent::Response(resp)) => {
                assert_eq!(resp.status, IndicationStatus::EngineBusy)
            }
            other => panic!("Expected response, got {:?}", other),
        }
        assert_eq!(engine.count_sent(MessageId::SetNmeaTypes), 2);
    }

    #[tokio::test]
    async fn test_stale_handle_rejected() {
        let engine = MockEngine::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = engine.open(WireEventMask::empty(), tx).await.unwrap();
        engine.close(handle).await.unwrap();

        let err = engine
            .send(handle, EngineRequest::GetEngineLock)
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::InvalidHandle);
    }
}
