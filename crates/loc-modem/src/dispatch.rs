//! Delivery of engine indications
//!
//! The transport pushes every indication into one channel. The dispatcher
//! drains it: responses complete pending synchronous waits, reports are
//! converted and handed to the reporter, and state-changing indications are
//! posted to the control worker, which applies them to the session under
//! the session lock. The dispatcher itself never takes that lock, so a
//! control operation waiting on a response can always be completed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use loc_core::{ApTimestamp, GnssStatus, LocationReporter};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::SystemClock;
use crate::convert::{
    convert_atl_request, convert_fix_session_state, convert_gnss_data, convert_measurement_set,
    convert_ni_request, convert_polynomial, convert_position, convert_sv_info,
    convert_xtra_request, ClockTracker,
};
use crate::session::SessionManager;
use crate::sync_req::SyncRequestTable;
use crate::transport::{ClientErrorKind, TransportEvent};
use crate::wire::{EngineEvent, EngineStateInd, NiNotifyVerifyInd};

/// State change handed from the dispatcher to the control worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    EngineState(bool),
    ServiceUnavailable,
}

/// NI requests awaiting a user response, keyed by the id reported upward
#[derive(Debug)]
pub struct NiRequestTable {
    next_id: AtomicU32,
    pending: Mutex<HashMap<u32, NiNotifyVerifyInd>>,
}

impl Default for NiRequestTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NiRequestTable {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, ind: NiNotifyVerifyInd) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().insert(id, ind);
        id
    }

    /// Remove and return the request stored under `id`
    pub fn take(&self, id: u32) -> Option<NiNotifyVerifyInd> {
        self.pending.lock().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Routes transport events to their consumers
pub struct EventDispatcher {
    reporter: Arc<dyn LocationReporter>,
    clock: Arc<dyn SystemClock>,
    timestamp_uncertainty_ms: f32,
    sync_table: Arc<SyncRequestTable>,
    clock_tracker: Arc<Mutex<ClockTracker>>,
    ni_requests: Arc<NiRequestTable>,
    control: mpsc::UnboundedSender<ControlMessage>,
}

impl EventDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reporter: Arc<dyn LocationReporter>,
        clock: Arc<dyn SystemClock>,
        timestamp_uncertainty_ms: f32,
        sync_table: Arc<SyncRequestTable>,
        clock_tracker: Arc<Mutex<ClockTracker>>,
        ni_requests: Arc<NiRequestTable>,
        control: mpsc::UnboundedSender<ControlMessage>,
    ) -> Self {
        Self {
            reporter,
            clock,
            timestamp_uncertainty_ms,
            sync_table,
            clock_tracker,
            ni_requests,
            control,
        }
    }

    /// Drain `events` on a background task until the channel closes
    pub fn spawn(self, mut events: mpsc::UnboundedReceiver<TransportEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.dispatch(event);
            }
            info!("Transport event channel closed");
        })
    }

    pub fn dispatch(&self, event: TransportEvent) {
        match event {
            TransportEvent::Response(response) => {
                self.sync_table.complete(response);
            }
            TransportEvent::Event(event) => self.handle_event(event),
            TransportEvent::Error(ClientErrorKind::ServiceUnavailable) => {
                self.post(ControlMessage::ServiceUnavailable);
            }
            TransportEvent::Error(kind) => {
                warn!(?kind, "Transport reported an error");
            }
        }
    }

    fn post(&self, msg: ControlMessage) {
        if self.control.send(msg).is_err() {
            warn!(?msg, "Control worker gone, dropping state change");
        }
    }

    fn ap_timestamp(&self) -> ApTimestamp {
        ApTimestamp {
            since_boot: self.clock.since_boot(),
            uncertainty_ms: self.timestamp_uncertainty_ms,
        }
    }

    fn handle_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::PositionReport(ind) => {
                let report = convert_position(&ind, self.ap_timestamp());
                self.reporter.report_position(report);
            }
            EngineEvent::SvInfo(ind) => {
                self.reporter.report_sv(convert_sv_info(&ind));
            }
            EngineEvent::Nmea(ind) => {
                self.reporter.report_nmea(ind.nmea);
            }
            EngineEvent::NiNotifyVerify(ind) => {
                let id = self.ni_requests.insert((*ind).clone());
                match convert_ni_request(id, &ind) {
                    Some(notification) => {
                        info!(id, ni_type = ?notification.ni_type, "NI request");
                        self.reporter.report_ni_request(notification);
                    }
                    None => {
                        self.ni_requests.take(id);
                    }
                }
            }
            EngineEvent::InjectTimeReq => self.reporter.request_time(),
            EngineEvent::InjectPositionReq => self.reporter.request_location(),
            EngineEvent::InjectPredictedOrbitsReq(ind) => {
                let servers = convert_xtra_request(&ind);
                if !servers.urls.is_empty() {
                    self.reporter.report_xtra_server_url(servers);
                }
                self.reporter.request_xtra_data();
            }
            EngineEvent::EngineState(EngineStateInd::On) => {
                self.post(ControlMessage::EngineState(true));
            }
            EngineEvent::EngineState(EngineStateInd::Off) => {
                self.post(ControlMessage::EngineState(false));
            }
            EngineEvent::EngineState(EngineStateInd::Unknown(raw)) => {
                debug!(raw, "Unknown engine state");
                self.reporter.report_status(GnssStatus::None);
            }
            EngineEvent::FixSessionState(ind) => {
                self.reporter.report_status(convert_fix_session_state(ind));
            }
            EngineEvent::LocationServerConnectionReq(ind) => {
                self.reporter.report_atl_request(convert_atl_request(&ind));
            }
            EngineEvent::GnssMeasurement(ind) => {
                let set = convert_measurement_set(&ind, self.ap_timestamp());
                self.reporter.report_sv_measurement(set);

                let data = convert_gnss_data(&ind, &mut self.clock_tracker.lock());
                if let Some(data) = data {
                    self.reporter.report_gnss_measurement(data);
                }
            }
            EngineEvent::SvPolynomial(ind) => match convert_polynomial(&ind) {
                Some(poly) => self.reporter.report_sv_polynomial(poly),
                None => debug!("SV polynomial without a usable satellite id"),
            },
        }
    }
}

/// Apply state changes from the dispatcher to the session, one at a time
pub fn spawn_control_worker(
    session: Arc<tokio::sync::Mutex<SessionManager>>,
    mut control: mpsc::UnboundedReceiver<ControlMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = control.recv().await {
            let mut session = session.lock().await;
            match msg {
                ControlMessage::EngineState(on) => session.on_engine_state(on).await,
                ControlMessage::ServiceUnavailable => session.recover_service().await,
            }
        }
        debug!("Control worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::wire::{
        EngineResponse, FixSessionStateInd, InjectPredictedOrbitsReqInd, MessageId, NiNotifyVerifyType,
        NiSuplPayload, NmeaInd, PositionReportInd, ServerConnReqInd, ServerRequestType,
    };
    use loc_core::{AtlRequest, ChannelReporter, LocationEvent, NiType};
    use pretty_assertions::assert_eq;

    struct Fixture {
        dispatcher: EventDispatcher,
        events: mpsc::UnboundedReceiver<LocationEvent>,
        control: mpsc::UnboundedReceiver<ControlMessage>,
        table: Arc<SyncRequestTable>,
        ni: Arc<NiRequestTable>,
    }

    fn fixture() -> Fixture {
        let (reporter, events) = ChannelReporter::new();
        let (control_tx, control) = mpsc::unbounded_channel();
        let table = Arc::new(SyncRequestTable::new());
        let ni = Arc::new(NiRequestTable::new());
        let dispatcher = EventDispatcher::new(
            Arc::new(reporter),
            Arc::new(ManualClock::new(Duration::from_secs(5), 0)),
            2.5,
            table.clone(),
            Arc::new(Mutex::new(ClockTracker::new())),
            ni.clone(),
            control_tx,
        );
        Fixture {
            dispatcher,
            events,
            control,
            table,
            ni,
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<LocationEvent>) -> Vec<LocationEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn test_engine_state_goes_to_control_worker() {
        let mut f = fixture();
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::EngineState(EngineStateInd::On)));
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::EngineState(EngineStateInd::Off)));
        f.dispatcher
            .dispatch(TransportEvent::Error(ClientErrorKind::ServiceUnavailable));

        assert_eq!(f.control.try_recv().unwrap(), ControlMessage::EngineState(true));
        assert_eq!(f.control.try_recv().unwrap(), ControlMessage::EngineState(false));
        assert_eq!(f.control.try_recv().unwrap(), ControlMessage::ServiceUnavailable);
        assert!(drain(&mut f.events).is_empty());
    }

    #[test]
    fn test_unknown_engine_state_reports_none() {
        let mut f = fixture();
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::EngineState(EngineStateInd::Unknown(9))));
        assert_eq!(drain(&mut f.events), vec![LocationEvent::Status(GnssStatus::None)]);
        assert!(f.control.try_recv().is_err());
    }

    #[test]
    fn test_other_client_errors_are_logged_only() {
        let mut f = fixture();
        f.dispatcher
            .dispatch(TransportEvent::Error(ClientErrorKind::Other(3)));
        assert!(f.control.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_response_completes_waiter() {
        let f = fixture();
        let (_, rx) = f.table.register(MessageId::SetOperationMode);
        f.dispatcher.dispatch(TransportEvent::Response(EngineResponse::success(
            MessageId::SetOperationMode,
        )));
        let response = rx.await.unwrap();
        assert_eq!(response.id, MessageId::SetOperationMode);
    }

    #[test]
    fn test_position_carries_ap_timestamp() {
        let mut f = fixture();
        let ind = PositionReportInd {
            latitude: Some(48.0),
            longitude: Some(11.0),
            hor_unc_circular: Some(10.0),
            ..Default::default()
        };
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::PositionReport(Box::new(ind))));
        match drain(&mut f.events).as_slice() {
            [LocationEvent::Position(report)] => {
                let ts = report.extended.ap_timestamp.unwrap();
                assert_eq!(ts.since_boot, Duration::from_secs(5));
                assert_eq!(ts.uncertainty_ms, 2.5);
            }
            other => panic!("Expected one position report, got {:?}", other),
        }
    }

    #[test]
    fn test_nmea_and_assistance_requests() {
        let mut f = fixture();
        f.dispatcher.dispatch(TransportEvent::Event(EngineEvent::Nmea(NmeaInd {
            nmea: "$GPGGA,".to_string(),
        })));
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::InjectTimeReq));
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::InjectPositionReq));
        assert_eq!(
            drain(&mut f.events),
            vec![
                LocationEvent::Nmea("$GPGGA,".to_string()),
                LocationEvent::TimeRequest,
                LocationEvent::LocationRequest,
            ]
        );
    }

    #[test]
    fn test_xtra_request_reports_servers_then_asks_for_data() {
        let mut f = fixture();
        f.dispatcher.dispatch(TransportEvent::Event(EngineEvent::InjectPredictedOrbitsReq(
            InjectPredictedOrbitsReqInd {
                server_list: vec!["https://a".into(), String::new(), "https://b".into()],
                ..Default::default()
            },
        )));
        let events = drain(&mut f.events);
        assert_eq!(events.len(), 2);
        match &events[0] {
            LocationEvent::XtraServerUrl(servers) => {
                assert_eq!(servers.urls, vec!["https://a".to_string(), "https://b".to_string()])
            }
            other => panic!("Expected server list, got {:?}", other),
        }
        assert_eq!(events[1], LocationEvent::XtraDataRequest);

        f.dispatcher.dispatch(TransportEvent::Event(EngineEvent::InjectPredictedOrbitsReq(
            InjectPredictedOrbitsReqInd::default(),
        )));
        assert_eq!(drain(&mut f.events), vec![LocationEvent::XtraDataRequest]);
    }

    #[test]
    fn test_ni_request_is_stored_until_answered() {
        let mut f = fixture();
        let mut ind = NiNotifyVerifyInd::new(NiNotifyVerifyType::NotifyOnly);
        ind.supl = Some(NiSuplPayload::default());
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::NiNotifyVerify(Box::new(ind.clone()))));

        let id = match drain(&mut f.events).as_slice() {
            [LocationEvent::NiRequest(n)] => {
                assert_eq!(n.ni_type, NiType::UmtsSupl);
                n.id
            }
            other => panic!("Expected NI request, got {:?}", other),
        };
        assert_eq!(f.ni.take(id), Some(ind));
        assert!(f.ni.is_empty());
    }

    #[test]
    fn test_ni_request_without_payload_is_dropped() {
        let mut f = fixture();
        let ind = NiNotifyVerifyInd::new(NiNotifyVerifyType::NotifyOnly);
        f.dispatcher
            .dispatch(TransportEvent::Event(EngineEvent::NiNotifyVerify(Box::new(ind))));
        assert!(drain(&mut f.events).is_empty());
        assert!(f.ni.is_empty());
    }

    #[test]
    fn test_session_state_and_atl() {
        let mut f = fixture();
        f.dispatcher.dispatch(TransportEvent::Event(EngineEvent::FixSessionState(
            FixSessionStateInd::Started,
        )));
        f.dispatcher.dispatch(TransportEvent::Event(
            EngineEvent::LocationServerConnectionReq(ServerConnReqInd {
                conn_handle: 7,
                request_type: ServerRequestType::Close,
                wwan_type: None,
            }),
        ));
        assert_eq!(
            drain(&mut f.events),
            vec![
                LocationEvent::Status(GnssStatus::SessionBegin),
                LocationEvent::AtlRequest(AtlRequest::Close { handle: 7 }),
            ]
        );
    }
}
