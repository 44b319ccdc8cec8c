//! Location adapter facade
//!
//! [`LocAdapter`] wires the transport, the dispatcher, the control worker
//! and the session manager together and exposes every operation of the
//! adapter. Operations are serialized on the session lock, so at most one
//! of them talks to the engine at a time.

use std::net::Ipv4Addr;
use std::sync::Arc;

use bytes::Bytes;
use loc_core::{
    AgpsType, AidingData, AppEventMask, AtlBearer, ConstellationSet, FixCriteria, GpsLockMask,
    LocError, LocResult, LocationReporter, NiResponse, NmeaTypes, SensorPerfControlConfig,
    SensorProperties, ServerKind, XtraServers, XtraVersionCheck, ZppFix,
};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::capability::{CapabilityCache, SupportedMessages};
use crate::clock::SystemClock;
use crate::config::AdapterConfig;
use crate::convert::ClockTracker;
use crate::dispatch::{spawn_control_worker, EventDispatcher, NiRequestTable};
use crate::services::{LocService, XtraInjectError};
use crate::session::{SessionManager, SessionState};
use crate::sync_req::{SyncClient, SyncRequestTable};
use crate::transport::{LocTransport, TransportClient};

/// One adapter instance per engine connection.
///
/// Must be created inside a tokio runtime; dropping it stops the background
/// tasks but does not close the connection.
pub struct LocAdapter {
    service: LocService,
    session: Arc<tokio::sync::Mutex<SessionManager>>,
    capabilities: Arc<RwLock<CapabilityCache>>,
    ni_requests: Arc<NiRequestTable>,
    reporter: Arc<dyn LocationReporter>,
    dispatcher: JoinHandle<()>,
    control_worker: JoinHandle<()>,
}

impl LocAdapter {
    pub fn new(
        transport: Arc<dyn LocTransport>,
        reporter: Arc<dyn LocationReporter>,
        clock: Arc<dyn SystemClock>,
        config: AdapterConfig,
    ) -> Self {
        let sync_table = Arc::new(SyncRequestTable::new());
        let clock_tracker = Arc::new(Mutex::new(ClockTracker::new()));
        let capabilities = Arc::new(RwLock::new(CapabilityCache::new()));
        let ni_requests = Arc::new(NiRequestTable::new());

        let sync = SyncClient::new(transport.clone(), sync_table.clone(), config.sync_timeout());
        let service = LocService::new(sync, clock.clone()).with_xtra_part_len(config.xtra_part_len);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let dispatcher = EventDispatcher::new(
            reporter.clone(),
            clock,
            config.ap_timestamp_uncertainty_ms,
            sync_table,
            clock_tracker.clone(),
            ni_requests.clone(),
            control_tx,
        )
        .spawn(event_rx);

        let session = Arc::new(tokio::sync::Mutex::new(SessionManager::new(
            TransportClient::new(transport),
            service.clone(),
            config,
            event_tx,
            reporter.clone(),
            capabilities.clone(),
            clock_tracker,
        )));
        let control_worker = spawn_control_worker(session.clone(), control_rx);

        Self {
            service,
            session,
            capabilities,
            ni_requests,
            reporter,
            dispatcher,
            control_worker,
        }
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Open the connection or add `mask` to the subscription
    pub async fn open(&self, mask: AppEventMask) -> LocResult<()> {
        self.session.lock().await.open(mask).await
    }

    pub async fn close(&self) -> LocResult<()> {
        info!("Closing location adapter");
        self.session.lock().await.close().await
    }

    pub async fn start_fix(&self, criteria: FixCriteria) -> LocResult<()> {
        self.session.lock().await.start_fix(criteria).await
    }

    pub async fn stop_fix(&self) -> LocResult<()> {
        self.session.lock().await.stop_fix().await
    }

    pub async fn set_position_mode(&self, criteria: FixCriteria) -> LocResult<()> {
        self.session.lock().await.set_position_mode(criteria).await
    }

    pub async fn set_time(&self, utc_ms: u64, reference_ms: u64, uncertainty_ms: u32) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .set_time(session.handle()?, utc_ms, reference_ms, uncertainty_ms)
            .await
    }

    pub async fn inject_position(&self, latitude: f64, longitude: f64, accuracy: f32) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .inject_position(session.handle()?, latitude, longitude, accuracy)
            .await
    }

    pub async fn delete_aiding_data(&self, flags: AidingData) -> LocResult<()> {
        self.session.lock().await.delete_aiding_data(flags).await
    }

    /// Answer the NI request reported upward with `id`
    pub async fn inform_ni_response(&self, id: u32, response: NiResponse) -> LocResult<()> {
        let session = self.session.lock().await;
        let handle = session.handle()?;
        let request = self.ni_requests.take(id).ok_or_else(|| {
            warn!(id, "NI response for an unknown request");
            LocError::invalid(format!("no pending NI request {}", id))
        })?;
        self.service.inform_ni_response(handle, response, &request).await
    }

    pub async fn set_server_url(&self, url: &str) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_server_url(session.handle()?, url).await
    }

    pub async fn set_server_addr(&self, ip: Ipv4Addr, port: u16, kind: ServerKind) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_server_addr(session.handle()?, ip, port, kind).await
    }

    /// Inject predicted-orbits data; returns the number of bytes injected
    pub async fn set_xtra_data(&self, data: Bytes) -> Result<usize, XtraInjectError> {
        let session = self.session.lock().await;
        let handle = session.handle().map_err(|source| XtraInjectError {
            injected: 0,
            part: 0,
            total_parts: 0,
            source,
        })?;
        self.service.set_xtra_data(handle, data).await
    }

    /// Query the predicted-orbits servers and report them upward
    pub async fn request_xtra_server(&self) -> LocResult<XtraServers> {
        let session = self.session.lock().await;
        let servers = self.service.request_xtra_server(session.handle()?).await?;
        self.reporter.report_xtra_server_url(servers.clone());
        Ok(servers)
    }

    pub async fn atl_open_status(
        &self,
        conn_handle: u32,
        success: bool,
        apn: Option<&str>,
        bearer: AtlBearer,
        agps_type: AgpsType,
    ) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .atl_open_status(session.handle()?, conn_handle, success, apn, bearer, agps_type)
            .await
    }

    pub async fn atl_close_status(&self, conn_handle: u32, success: bool) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .atl_close_status(session.handle()?, conn_handle, success)
            .await
    }

    pub async fn set_supl_version(&self, version: u32) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_supl_version(session.handle()?, version).await
    }

    pub async fn set_nmea_types(&self, types: NmeaTypes) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_nmea_types(session.handle()?, types).await
    }

    pub async fn set_lpp_config(&self, profile: u32) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_lpp_config(session.handle()?, profile).await
    }

    pub async fn set_aglonass_protocol(&self, mask: u32) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_aglonass_protocol(session.handle()?, mask).await
    }

    pub async fn set_lppe_protocol(&self, cp: u64, up: u64) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_lppe_protocol(session.handle()?, cp, up).await
    }

    pub async fn set_sensor_control_config(&self, disabled: bool, provider: i32) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .set_sensor_control_config(session.handle()?, disabled, provider)
            .await
    }

    pub async fn set_sensor_properties(&self, properties: SensorProperties) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .set_sensor_properties(session.handle()?, properties)
            .await
    }

    pub async fn set_sensor_perf_control_config(&self, config: SensorPerfControlConfig) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .set_sensor_perf_control_config(session.handle()?, config)
            .await
    }

    pub async fn get_wwan_zpp_fix(&self) -> LocResult<ZppFix> {
        let session = self.session.lock().await;
        self.service.get_wwan_zpp_fix(session.handle()?).await
    }

    pub async fn get_best_available_zpp_fix(&self) -> LocResult<ZppFix> {
        let session = self.session.lock().await;
        self.service.get_best_available_zpp_fix(session.handle()?).await
    }

    pub async fn set_gps_lock(&self, mask: GpsLockMask) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service.set_gps_lock(session.handle()?, mask).await
    }

    pub async fn get_gps_lock(&self) -> LocResult<GpsLockMask> {
        let session = self.session.lock().await;
        self.service.get_gps_lock(session.handle()?).await
    }

    pub async fn set_xtra_version_check(&self, check: XtraVersionCheck) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .set_xtra_version_check(session.handle()?, check)
            .await
    }

    pub async fn install_agps_cert(&self, certs: &[Bytes], slot_mask: u32) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .install_agps_cert(session.handle()?, certs, slot_mask)
            .await
    }

    pub async fn set_sv_measurement_constellation(&self, constellations: ConstellationSet) -> LocResult<()> {
        let session = self.session.lock().await;
        self.service
            .set_sv_measurement_constellation(session.handle()?, constellations)
            .await
    }

    /// Whether the engine reports GNSS measurements, as probed on open
    pub fn gnss_constellation_config(&self) -> bool {
        self.capabilities.read().gnss_measurement_supported()
    }

    pub fn is_message_supported(&self, msg: SupportedMessages) -> bool {
        self.capabilities.read().is_message_supported(msg)
    }

    pub fn is_feature_supported(&self, feature: usize) -> bool {
        self.capabilities.read().is_feature_supported(feature)
    }

    /// Number of NI requests still waiting for a user response
    pub fn pending_ni_requests(&self) -> usize {
        self.ni_requests.len()
    }
}

impl Drop for LocAdapter {
    fn drop(&mut self) {
        self.dispatcher.abort();
        self.control_worker.abort();
    }
}
