//! Session manager for the engine connection

use std::sync::Arc;

use loc_core::{
    AidingData, AppEventMask, FixCriteria, GnssStatus, LocError, LocResult, LocationReporter,
    PositionMode,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::SessionState;
use crate::capability::{probe_capabilities, probe_measurement_support, CapabilityCache};
use crate::config::AdapterConfig;
use crate::convert::ClockTracker;
use crate::fallback::DeleteAidingStrategy;
use crate::mask::{effective_mask, suppress_session_only_bits, translate, wants_measurements};
use crate::services::LocService;
use crate::transport::{ClientHandle, EventSink, TransportClient};
use crate::wire::{
    ApplicationId, EngineRequest, OperationMode, StartRequest, WireEventMask, DEFAULT_SESSION_ID,
    MAX_APP_ID_NAME_LENGTH, MAX_APP_ID_PROVIDER_LENGTH,
};

pub fn operation_mode(mode: PositionMode) -> OperationMode {
    match mode {
        PositionMode::Standalone => OperationMode::Standalone,
        PositionMode::MsBased => OperationMode::Msb,
        PositionMode::MsAssisted => OperationMode::Msa,
        PositionMode::CellId => OperationMode::CellId,
        PositionMode::Wwan => OperationMode::Wwan,
    }
}

/// Longest prefix of `s` that fits in a field of `size` bytes including
/// its terminator
fn truncated(s: &str, size: usize) -> String {
    let mut end = s.len().min(size.saturating_sub(1));
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

/// Build the start request for `criteria`
pub fn start_request(criteria: &FixCriteria) -> StartRequest {
    let application_id = criteria
        .credentials
        .as_ref()
        .filter(|c| !c.name.is_empty())
        .map(|c| ApplicationId {
            name: truncated(&c.name, MAX_APP_ID_NAME_LENGTH),
            provider: truncated(&c.provider, MAX_APP_ID_PROVIDER_LENGTH),
        });

    StartRequest {
        session_id: DEFAULT_SESSION_ID,
        fix_recurrence: criteria.recurrence,
        min_interval_ms: criteria.min_interval_ms,
        horizontal_accuracy: criteria.horizontal_accuracy(),
        share_position: criteria.share_position,
        application_id,
        config_altitude_assumed: false,
    }
}

/// Owns the connection handle and the session flags.
///
/// All methods take `&mut self`; the adapter keeps the manager behind a
/// single async mutex so control operations and engine-state reactions
/// never interleave.
pub struct SessionManager {
    client: TransportClient,
    service: LocService,
    config: AdapterConfig,
    sink: EventSink,
    reporter: Arc<dyn LocationReporter>,
    capabilities: Arc<RwLock<CapabilityCache>>,
    clock_tracker: Arc<Mutex<ClockTracker>>,
    delete_strategy: DeleteAidingStrategy,
    app_mask: AppEventMask,
    wire_mask: WireEventMask,
    in_session: bool,
    engine_on: bool,
    last_criteria: Option<FixCriteria>,
}

impl SessionManager {
    pub fn new(
        client: TransportClient,
        service: LocService,
        config: AdapterConfig,
        sink: EventSink,
        reporter: Arc<dyn LocationReporter>,
        capabilities: Arc<RwLock<CapabilityCache>>,
        clock_tracker: Arc<Mutex<ClockTracker>>,
    ) -> Self {
        Self {
            client,
            service,
            config,
            sink,
            reporter,
            capabilities,
            clock_tracker,
            delete_strategy: DeleteAidingStrategy::new(),
            app_mask: AppEventMask::empty(),
            wire_mask: WireEventMask::empty(),
            in_session: false,
            engine_on: false,
            last_criteria: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if !self.client.is_open() {
            SessionState::Closed
        } else if self.in_session {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn is_in_session(&self) -> bool {
        self.in_session
    }

    pub fn is_engine_on(&self) -> bool {
        self.engine_on
    }

    pub fn app_mask(&self) -> AppEventMask {
        self.app_mask
    }

    /// Full wire mask, before session-only suppression
    pub fn wire_mask(&self) -> WireEventMask {
        self.wire_mask
    }

    pub fn last_criteria(&self) -> Option<&FixCriteria> {
        self.last_criteria.as_ref()
    }

    pub fn service(&self) -> &LocService {
        &self.service
    }

    /// Handle of the open connection
    pub fn handle(&self) -> LocResult<ClientHandle> {
        self.client.require_handle().map_err(LocError::from)
    }

    /// Register the wire mask, suppressed unless a session is running
    async fn register_mask(&self, wire: WireEventMask) -> LocResult<()> {
        let mask = effective_mask(wire, self.in_session);
        self.client
            .register_event_mask(mask)
            .await
            .map_err(LocError::from)
    }

    /// Re-register the current mask; failures are only logged
    async fn refresh_mask(&self) {
        if let Err(e) = self.register_mask(self.wire_mask).await {
            warn!(error = %e, "Event mask registration failed");
        }
    }

    /// Open the connection, or widen the subscription of an open one.
    ///
    /// `mask` is added to the categories already subscribed, minus the
    /// configured exclusions. Capabilities are probed only when the
    /// connection is actually opened.
    pub async fn open(&mut self, mask: AppEventMask) -> LocResult<()> {
        let new_mask = self.app_mask | mask.difference(self.config.excluded_events);
        let wire = translate(new_mask);

        if !self.client.is_open() {
            let handle = match self
                .client
                .open(suppress_session_only_bits(wire), self.sink.clone())
                .await
            {
                Ok(handle) => handle,
                Err(e) => {
                    error!(error = %e, "Failed to open location client");
                    self.app_mask = AppEventMask::empty();
                    self.wire_mask = WireEventMask::empty();
                    return Err(e.into());
                }
            };
            self.app_mask = new_mask;
            self.wire_mask = wire;

            let mut cache = self.capabilities.read().clone();
            probe_capabilities(&self.client, self.service.sync(), handle, &mut cache).await;
            *self.capabilities.write() = cache;
        } else if new_mask != self.app_mask {
            if let Err(e) = self.register_mask(wire).await {
                warn!(error = %e, mask = ?new_mask, "Event mask update failed");
                return Err(e);
            }
            debug!(mask = ?new_mask, "Event mask updated");
            self.app_mask = new_mask;
            self.wire_mask = wire;
        }

        let handle = self.handle()?;
        if wants_measurements(wire) {
            let constellations = self.config.measurement_constellations;
            if let Err(e) = self
                .service
                .set_sv_measurement_constellation(handle, constellations)
                .await
            {
                warn!(error = %e, ?constellations, "Measurement constellation setup failed");
            }
        }

        let mut cache = self.capabilities.read().clone();
        probe_measurement_support(self.service.sync(), handle, self.wire_mask, &mut cache).await;
        *self.capabilities.write() = cache;
        Ok(())
    }

    /// Close the connection. Closing a closed adapter succeeds.
    pub async fn close(&mut self) -> LocResult<()> {
        let result = self.client.close().await;
        self.app_mask = AppEventMask::empty();
        self.wire_mask = WireEventMask::empty();
        self.in_session = false;
        self.engine_on = false;
        result.map_err(LocError::from)
    }

    /// Start, or restart, a fix session.
    ///
    /// The operation mode is negotiated first. A timeout on that step is
    /// tolerated; any other failure leaves the session stopped.
    pub async fn start_fix(&mut self, criteria: FixCriteria) -> LocResult<()> {
        let handle = self.handle()?;
        info!(mode = ?criteria.mode, recurrence = ?criteria.recurrence, "Starting fix session");

        self.in_session = true;
        self.clock_tracker.lock().mark_measurements_started();
        self.refresh_mask().await;

        let mode = operation_mode(criteria.mode);
        match self
            .service
            .sync()
            .request(handle, EngineRequest::SetOperationMode(mode))
            .await
        {
            Ok(_) => {}
            Err(LocError::Timeout) => {
                warn!(?mode, "Operation mode not acknowledged, starting anyway");
            }
            Err(e) => {
                error!(error = %e, ?mode, "Operation mode rejected");
                self.abort_session().await;
                return Err(e);
            }
        }

        let request = start_request(&criteria);
        if let Err(e) = self.client.send(EngineRequest::Start(request)).await {
            error!(error = %e, "Start request failed");
            self.abort_session().await;
            return Err(e.into());
        }

        self.last_criteria = Some(criteria);
        Ok(())
    }

    async fn abort_session(&mut self) {
        self.in_session = false;
        self.refresh_mask().await;
    }

    /// Stop the fix session.
    ///
    /// Session-only events are unsubscribed right away if the engine never
    /// reported power-on; otherwise the engine-off indication does it.
    pub async fn stop_fix(&mut self) -> LocResult<()> {
        self.handle()?;
        info!("Stopping fix session");
        let result = self
            .client
            .send(EngineRequest::Stop {
                session_id: DEFAULT_SESSION_ID,
            })
            .await;
        self.in_session = false;

        if !self.engine_on {
            self.refresh_mask().await;
        }
        result.map_err(|e| {
            warn!(error = %e, "Stop request failed");
            e.into()
        })
    }

    /// Apply new criteria; restarts a running session, no-op when idle
    pub async fn set_position_mode(&mut self, criteria: FixCriteria) -> LocResult<()> {
        if self.in_session {
            self.start_fix(criteria).await
        } else {
            debug!("Position mode set outside of a session");
            Ok(())
        }
    }

    /// React to an engine power indication
    pub async fn on_engine_state(&mut self, on: bool) {
        debug!(on, in_session = self.in_session, "Engine state changed");
        if self.engine_on && !self.in_session && !on {
            self.refresh_mask().await;
        }
        self.engine_on = on;

        if on {
            if self.in_session {
                self.reporter.report_status(GnssStatus::EngineOn);
                self.reporter.report_status(GnssStatus::SessionBegin);
            }
        } else {
            self.reporter.report_status(GnssStatus::SessionEnd);
            self.reporter.report_status(GnssStatus::EngineOff);
        }
    }

    /// Tear down and reopen after the remote service went away, restarting
    /// a running session with its last criteria
    pub async fn recover_service(&mut self) {
        warn!(handle = ?self.client.handle(), "Location service unavailable, reconnecting");

        let app_mask = self.app_mask;
        let resume = if self.in_session {
            self.last_criteria.clone()
        } else {
            None
        };

        if let Err(e) = self.client.close().await {
            warn!(error = %e, "Closing stale handle failed");
        }
        self.app_mask = AppEventMask::empty();
        self.wire_mask = WireEventMask::empty();
        self.in_session = false;
        self.engine_on = false;
        self.capabilities.write().reset_measurement_support();
        self.delete_strategy.reset();

        if let Err(e) = self.open(app_mask).await {
            error!(error = %e, "Reopen after service loss failed");
            return;
        }
        info!("Location client reopened");

        if let Some(criteria) = resume {
            if let Err(e) = self.start_fix(criteria).await {
                error!(error = %e, "Session restart after service loss failed");
            }
        }
    }

    pub async fn delete_aiding_data(&mut self, flags: AidingData) -> LocResult<()> {
        let handle = self.handle()?;
        self.delete_strategy
            .delete(self.service.sync(), handle, flags)
            .await
    }

    pub fn delete_strategy(&self) -> &DeleteAidingStrategy {
        &self.delete_strategy
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::fallback::DeleteApi;
    use crate::sync_req::{SyncClient, SyncRequestTable};
    use crate::transport::{MockEngine, MockReply, TransportEvent};
    use crate::wire::{EngineResponse, IndicationStatus, MessageId};
    use loc_core::{AppCredentials, ChannelReporter, LocationEvent, Recurrence};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    struct Fixture {
        manager: SessionManager,
        engine: Arc<MockEngine>,
        events: mpsc::UnboundedReceiver<LocationEvent>,
        capabilities: Arc<RwLock<CapabilityCache>>,
    }

    fn fixture(config: AdapterConfig) -> Fixture {
        let engine = Arc::new(MockEngine::new());
        let table = Arc::new(SyncRequestTable::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let routing = table.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let TransportEvent::Response(resp) = event {
                    routing.complete(resp);
                }
            }
        });

        let sync = SyncClient::new(engine.clone(), table, Duration::from_millis(100));
        let service = LocService::new(sync, Arc::new(ManualClock::default()));
        let (reporter, events) = ChannelReporter::new();
        let capabilities = Arc::new(RwLock::new(CapabilityCache::new()));
        let manager = SessionManager::new(
            TransportClient::new(engine.clone()),
            service,
            config,
            tx,
            Arc::new(reporter),
            capabilities.clone(),
            Arc::new(Mutex::new(ClockTracker::new())),
        );
        Fixture {
            manager,
            engine,
            events,
            capabilities,
        }
    }

    fn statuses(rx: &mut mpsc::UnboundedReceiver<LocationEvent>) -> Vec<GnssStatus> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let LocationEvent::Status(status) = event {
                out.push(status);
            }
        }
        out
    }

    fn app_mask() -> AppEventMask {
        AppEventMask::POSITION_REPORT
            | AppEventMask::SATELLITE_REPORT
            | AppEventMask::STATUS_REPORT
            | AppEventMask::NI_NOTIFY_VERIFY_REQUEST
    }

    #[test]
    fn test_start_request_fields() {
        let criteria = FixCriteria {
            mode: PositionMode::MsBased,
            recurrence: Recurrence::Single,
            min_interval_ms: 500,
            preferred_accuracy_m: Some(50),
            share_position: false,
            credentials: Some(AppCredentials {
                name: "n".repeat(40),
                provider: "vendor".to_string(),
            }),
        };
        let req = start_request(&criteria);
        assert_eq!(req.session_id, DEFAULT_SESSION_ID);
        assert_eq!(req.fix_recurrence, Recurrence::Single);
        assert_eq!(req.min_interval_ms, 500);
        assert_eq!(req.horizontal_accuracy, Some(loc_core::HorizontalAccuracy::High));
        assert!(!req.share_position);
        let app = req.application_id.unwrap();
        assert_eq!(app.name.len(), MAX_APP_ID_NAME_LENGTH - 1);
        assert_eq!(app.provider, "vendor");

        let anonymous = FixCriteria {
            credentials: Some(AppCredentials::default()),
            ..FixCriteria::default()
        };
        assert_eq!(start_request(&anonymous).application_id, None);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        assert_eq!(truncated("äbc", 2), "");
        assert_eq!(truncated("äbc", 3), "ä");
        assert_eq!(truncated("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_open_registers_suppressed_mask_and_probes_once() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        assert_eq!(f.manager.state(), SessionState::Idle);
        assert_eq!(
            f.engine.registered_masks(),
            vec![suppress_session_only_bits(translate(app_mask()))]
        );
        assert_eq!(f.engine.count_sent(MessageId::GetSupportedFeature), 1);

        f.manager.open(app_mask()).await.unwrap();
        assert_eq!(f.engine.registered_masks().len(), 1);
        assert_eq!(f.engine.open_count(), 1);
        assert_eq!(f.engine.count_sent(MessageId::GetSupportedFeature), 1);

        f.manager.open(AppEventMask::NMEA_1HZ_REPORT).await.unwrap();
        assert_eq!(f.engine.registered_masks().len(), 2);
        assert_eq!(f.engine.count_sent(MessageId::GetSupportedFeature), 1);
        assert!(f.manager.app_mask().contains(AppEventMask::NMEA_1HZ_REPORT));
    }

    #[tokio::test]
    async fn test_open_excludes_configured_events() {
        let config = AdapterConfig {
            excluded_events: AppEventMask::SATELLITE_REPORT,
            ..AdapterConfig::default()
        };
        let mut f = fixture(config);
        f.manager.open(app_mask()).await.unwrap();
        assert!(!f.manager.app_mask().contains(AppEventMask::SATELLITE_REPORT));
        assert!(!f.manager.wire_mask().contains(WireEventMask::GNSS_SV_INFO));
    }

    #[tokio::test]
    async fn test_open_failure_clears_mask() {
        let mut f = fixture(AdapterConfig::default());
        f.engine.set_fail_open(true);
        let err = f.manager.open(app_mask()).await.unwrap_err();
        assert_eq!(err, LocError::ServiceNotPresent);
        assert_eq!(f.manager.state(), SessionState::Closed);
        assert!(f.manager.app_mask().is_empty());
    }

    #[tokio::test]
    async fn test_open_probes_measurement_support() {
        let mut f = fixture(AdapterConfig::default());
        f.manager
            .open(AppEventMask::POSITION_REPORT | AppEventMask::GNSS_MEASUREMENT)
            .await
            .unwrap();
        // constellation setup plus the support probe
        assert_eq!(f.engine.count_sent(MessageId::SetGnssConstellReportConfig), 2);
        assert!(f.capabilities.read().gnss_measurement_supported());

        f.manager.open(AppEventMask::NMEA_1HZ_REPORT).await.unwrap();
        assert_eq!(f.engine.count_sent(MessageId::SetGnssConstellReportConfig), 3);
    }

    #[tokio::test]
    async fn test_start_stop_leaves_suppressed_mask() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.manager.start_fix(FixCriteria::default()).await.unwrap();
        assert_eq!(f.manager.state(), SessionState::Active);
        assert_eq!(f.engine.last_registered_mask(), Some(translate(app_mask())));

        let ids = f.engine.sent_ids();
        let mode_pos = ids.iter().position(|id| *id == MessageId::SetOperationMode).unwrap();
        let start_pos = ids.iter().position(|id| *id == MessageId::Start).unwrap();
        assert!(mode_pos < start_pos);

        f.manager.stop_fix().await.unwrap();
        assert_eq!(f.manager.state(), SessionState::Idle);
        assert_eq!(
            f.engine.last_registered_mask(),
            Some(suppress_session_only_bits(translate(app_mask())))
        );
        assert_eq!(f.engine.count_sent(MessageId::Stop), 1);
    }

    #[tokio::test]
    async fn test_stop_defers_suppression_while_engine_on() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.manager.start_fix(FixCriteria::default()).await.unwrap();
        f.manager.on_engine_state(true).await;
        let registered = f.engine.registered_masks().len();

        f.manager.stop_fix().await.unwrap();
        assert_eq!(f.engine.registered_masks().len(), registered);

        f.manager.on_engine_state(false).await;
        assert_eq!(
            f.engine.last_registered_mask(),
            Some(suppress_session_only_bits(translate(app_mask())))
        );
    }

    #[tokio::test]
    async fn test_operation_mode_timeout_is_tolerated() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.engine.reply_once(MessageId::SetOperationMode, MockReply::NoResponse);
        f.manager.start_fix(FixCriteria::default()).await.unwrap();
        assert_eq!(f.engine.count_sent(MessageId::Start), 1);
        assert!(f.manager.is_in_session());
    }

    #[tokio::test]
    async fn test_operation_mode_failure_rolls_back() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.engine.reply_once(
            MessageId::SetOperationMode,
            MockReply::Respond(EngineResponse::with_status(
                MessageId::SetOperationMode,
                IndicationStatus::EngineBusy,
            )),
        );
        let err = f.manager.start_fix(FixCriteria::default()).await.unwrap_err();
        assert_eq!(err, LocError::EngineBusy);
        assert_eq!(f.engine.count_sent(MessageId::Start), 0);
        assert_eq!(f.manager.state(), SessionState::Idle);
        assert_eq!(
            f.engine.last_registered_mask(),
            Some(suppress_session_only_bits(translate(app_mask())))
        );
    }

    #[tokio::test]
    async fn test_start_without_open() {
        let mut f = fixture(AdapterConfig::default());
        let err = f.manager.start_fix(FixCriteria::default()).await.unwrap_err();
        assert_eq!(err, LocError::InvalidHandle);
        assert!(!f.manager.is_in_session());
    }

    #[tokio::test]
    async fn test_engine_state_reports() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();

        f.manager.on_engine_state(true).await;
        assert_eq!(statuses(&mut f.events), vec![]);

        f.manager.start_fix(FixCriteria::default()).await.unwrap();
        f.manager.on_engine_state(true).await;
        assert_eq!(
            statuses(&mut f.events),
            vec![GnssStatus::EngineOn, GnssStatus::SessionBegin]
        );

        f.manager.on_engine_state(false).await;
        assert_eq!(
            statuses(&mut f.events),
            vec![GnssStatus::SessionEnd, GnssStatus::EngineOff]
        );
    }

    #[tokio::test]
    async fn test_position_mode_restarts_only_active_session() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.manager.set_position_mode(FixCriteria::default()).await.unwrap();
        assert_eq!(f.engine.count_sent(MessageId::Start), 0);

        f.manager.start_fix(FixCriteria::default()).await.unwrap();
        let criteria = FixCriteria {
            mode: PositionMode::MsAssisted,
            ..FixCriteria::default()
        };
        f.manager.set_position_mode(criteria.clone()).await.unwrap();
        assert_eq!(f.engine.count_sent(MessageId::Start), 2);
        assert_eq!(f.manager.last_criteria(), Some(&criteria));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.manager.close().await.unwrap();
        f.manager.close().await.unwrap();
        assert_eq!(f.manager.state(), SessionState::Closed);
        assert_eq!(f.engine.close_count(), 1);
    }

    #[tokio::test]
    async fn test_recovery_reopens_and_restarts_session() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.manager.start_fix(FixCriteria::default()).await.unwrap();
        f.capabilities
            .write()
            .set_measurement_support(crate::capability::MeasurementSupport::Unsupported);

        f.manager.recover_service().await;
        assert_eq!(f.engine.close_count(), 1);
        assert_eq!(f.engine.open_count(), 2);
        assert_eq!(f.manager.state(), SessionState::Active);
        assert_eq!(f.manager.app_mask(), app_mask());
        assert_eq!(f.engine.count_sent(MessageId::Start), 2);
        // position reports subscribed, so the probe ran again
        assert!(f.capabilities.read().gnss_measurement_supported());
    }

    #[tokio::test]
    async fn test_delete_fallback_demotes_on_unsupported() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.engine.set_reply(
            MessageId::DeleteGnssServiceData,
            MockReply::Respond(EngineResponse::with_status(
                MessageId::DeleteGnssServiceData,
                IndicationStatus::Unsupported,
            )),
        );

        f.manager.delete_aiding_data(AidingData::EPHEMERIS).await.unwrap();
        assert_eq!(f.manager.delete_strategy().api(), DeleteApi::Legacy);
        assert_eq!(f.engine.count_sent(MessageId::DeleteAssistData), 1);

        f.manager.delete_aiding_data(AidingData::ALL).await.unwrap();
        assert_eq!(f.engine.count_sent(MessageId::DeleteGnssServiceData), 1);
        assert_eq!(f.engine.count_sent(MessageId::DeleteAssistData), 2);

        f.manager.recover_service().await;
        assert_eq!(f.manager.delete_strategy().api(), DeleteApi::Current);
    }

    #[tokio::test]
    async fn test_delete_internal_error_retries_legacy_once() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.engine.reply_once(
            MessageId::DeleteGnssServiceData,
            MockReply::Reject(crate::transport::TransportError::Internal("ipc".into())),
        );
        f.manager.delete_aiding_data(AidingData::TIME).await.unwrap();
        assert_eq!(f.manager.delete_strategy().api(), DeleteApi::Current);
        assert_eq!(f.engine.count_sent(MessageId::DeleteAssistData), 1);
    }

    #[tokio::test]
    async fn test_delete_timeout_does_not_fall_back() {
        let mut f = fixture(AdapterConfig::default());
        f.manager.open(app_mask()).await.unwrap();
        f.engine.reply_once(MessageId::DeleteGnssServiceData, MockReply::NoResponse);
        let err = f.manager.delete_aiding_data(AidingData::TIME).await.unwrap_err();
        assert_eq!(err, LocError::Timeout);
        assert_eq!(f.engine.count_sent(MessageId::DeleteAssistData), 0);
    }
}
