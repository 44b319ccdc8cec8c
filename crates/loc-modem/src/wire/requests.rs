//! Requests sent to the engine

use std::net::Ipv4Addr;

use bitflags::bitflags;
use bytes::Bytes;
use loc_core::{
    ConstellationSet, HorizontalAccuracy, NmeaTypes, Recurrence, SensorPerfControlConfig,
    SensorProperties, SensorProvider, XtraVersionCheck,
};

use super::{
    MessageId, NiNotifyVerifyType, NiSuplEmergency, NiSuplPayload, NiSuplVer2Ext,
    NiUmtsCpPayload, NiVxPayload, NiVxServiceInteraction, SvSystem,
};

/// Positioning mode as understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    Standalone,
    Msb,
    Msa,
    CellId,
    Wwan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationId {
    pub name: String,
    pub provider: String,
}

/// Fix session start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub session_id: u8,
    pub fix_recurrence: Recurrence,
    pub min_interval_ms: u32,
    pub horizontal_accuracy: Option<HorizontalAccuracy>,
    pub share_position: bool,
    pub application_id: Option<ApplicationId>,
    /// Whether the engine may assume an altitude for 2D fixes
    pub config_altitude_assumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectPositionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub hor_unc_circular: f32,
    pub hor_confidence: u8,
    pub raw_hor_unc_circular: f32,
    pub raw_hor_confidence: u8,
    pub timestamp_utc_ms: u64,
}

bitflags! {
    /// Per-satellite data categories of the current delete request
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeleteSatDataMask: u32 {
        const EPH = 0x0001;
        const ALM = 0x0002;
        const SVHEALTH = 0x0004;
        const SVDIR = 0x0008;
        const SVSTEER = 0x0010;
        const ALM_CORR = 0x0020;
        const BLACKLIST = 0x0040;
        const SA_DATA = 0x0080;
        const SV_NO_EXIST = 0x0100;
        const IONO = 0x0200;
        const TIME = 0x0400;
    }
}

bitflags! {
    /// Constellations addressed by a delete request
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GnssSystemMask: u32 {
        const GPS = 0x01;
        const GLO = 0x02;
        const BDS = 0x04;
        const GAL = 0x08;
        const QZSS = 0x10;
    }
}

bitflags! {
    /// Receiver-wide data categories of the current delete request
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeleteCommonDataMask: u32 {
        const POS = 0x01;
        const TIME = 0x02;
        const UTC = 0x04;
        const RTI = 0x08;
        const FREQ_BIAS_EST = 0x10;
    }
}

bitflags! {
    /// Cell database categories
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellDbMask: u32 {
        const POS = 0x0001;
        const LATEST_GPS_POS = 0x0002;
        const OTA_POS = 0x0004;
        const EXT_REF_POS = 0x0008;
        const TIMETAG = 0x0010;
        const CELLID = 0x0020;
        const CACHED_CELLID = 0x0040;
        const LAST_SRV_CELL = 0x0080;
        const CUR_SRV_CELL = 0x0100;
        const NEIGHBOR_INFO = 0x0200;
    }
}

bitflags! {
    /// Data categories of the legacy delete request
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeleteGnssDataMask: u64 {
        const GPS_SVDIR = 0x0000_0001;
        const GPS_SVSTEER = 0x0000_0002;
        const GPS_TIME = 0x0000_0004;
        const GPS_ALM_CORR = 0x0000_0008;
        const GLO_SVDIR = 0x0000_0010;
        const GLO_SVSTEER = 0x0000_0020;
        const GLO_TIME = 0x0000_0040;
        const GLO_ALM_CORR = 0x0000_0080;
        const SBAS_SVDIR = 0x0000_0100;
        const SBAS_SVSTEER = 0x0000_0200;
        const POSITION = 0x0000_0400;
        const TIME = 0x0000_0800;
        const IONO = 0x0000_1000;
        const UTC = 0x0000_2000;
        const HEALTH = 0x0000_4000;
        const SADATA = 0x0000_8000;
        const RTI = 0x0001_0000;
        const SV_NO_EXIST = 0x0002_0000;
        const FREQ_BIAS_EST = 0x0004_0000;
    }
}

bitflags! {
    /// Per-satellite categories of the legacy delete request
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeleteSvInfoMask: u8 {
        const EPHEMERIS = 0x01;
        const ALMANAC = 0x02;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSvInfo {
    pub gnss_sv_id: u16,
    pub system: SvSystem,
    pub delete_mask: DeleteSvInfoMask,
}

/// Current-generation aiding data deletion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteGnssServiceDataRequest {
    pub delete_all: bool,
    pub sat_data: Option<(GnssSystemMask, DeleteSatDataMask)>,
    pub common_data: Option<DeleteCommonDataMask>,
    pub cell_db: Option<CellDbMask>,
}

/// Legacy aiding data deletion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteAssistDataRequest {
    pub delete_all: bool,
    pub sv_info: Vec<DeleteSvInfo>,
    pub gnss_data: Option<DeleteGnssDataMask>,
    pub cell_db: Option<CellDbMask>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NiUserResponse {
    Accept,
    Deny,
    NoResponse,
}

/// User response to an NI request, echoing the request's payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NiUserResponseRequest {
    pub user_response: NiUserResponse,
    pub notification_type: NiNotifyVerifyType,
    pub vx: Option<NiVxPayload>,
    pub supl: Option<NiSuplPayload>,
    pub umts_cp: Option<NiUmtsCpPayload>,
    pub vx_service_interaction: Option<NiVxServiceInteraction>,
    pub supl_ver2_ext: Option<NiSuplVer2Ext>,
    pub supl_emergency: Option<NiSuplEmergency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerType {
    CdmaPde,
    CdmaMpc,
    UmtsSlp,
    CustomPde,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetServerRequest {
    pub server_type: ServerType,
    pub ipv4: Option<(Ipv4Addr, u16)>,
    pub url: Option<String>,
}

/// One part of a chunked predicted-orbits injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictedOrbitsPart {
    pub total_size: u32,
    pub total_parts: u16,
    /// 1-based part number
    pub part_num: u16,
    pub part_data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerConnStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdnType {
    Ipv4,
    Ipv6,
    Ipv4v6,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApnProfile {
    pub pdn_type: PdnType,
    pub apn_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConnStatusRequest {
    pub conn_handle: u32,
    pub request_type: super::ServerRequestType,
    pub status: ServerConnStatus,
    pub apn_profile: Option<ApnProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireSuplVersion {
    V1_0,
    V2_0,
    V2_0_2,
}

/// Protocol parameters; each request sets exactly the fields that are `Some`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolConfig {
    pub supl_version: Option<WireSuplVersion>,
    pub lpp_config: Option<u32>,
    pub assisted_glo_protocol_mask: Option<u32>,
    pub lppe_cp_config: Option<u64>,
    pub lppe_up_config: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorsUsage {
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorControlRequest {
    pub sensors_usage: SensorsUsage,
    pub sensor_provider: SensorProvider,
}

/// Engine lock as understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLock {
    None,
    /// Mobile-initiated sessions locked
    Mi,
    /// Mobile-terminated sessions locked
    Mt,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstellationReportConfig {
    pub measurement: Option<ConstellationSet>,
    pub sv_polynomial: Option<ConstellationSet>,
}

/// Request sent to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineRequest {
    SetOperationMode(OperationMode),
    Start(StartRequest),
    Stop { session_id: u8 },
    InjectUtcTime { time_utc_ms: u64, time_unc_ms: u32 },
    InjectPosition(InjectPositionRequest),
    DeleteGnssServiceData(DeleteGnssServiceDataRequest),
    DeleteAssistData(DeleteAssistDataRequest),
    NiUserResponse(Box<NiUserResponseRequest>),
    SetServer(SetServerRequest),
    InjectPredictedOrbitsData(PredictedOrbitsPart),
    GetPredictedOrbitsDataSource,
    InformLocationServerConnStatus(ServerConnStatusRequest),
    SetProtocolConfigParameters(ProtocolConfig),
    SetNmeaTypes(NmeaTypes),
    SetSensorControlConfig(SensorControlRequest),
    SetSensorProperties(SensorProperties),
    SetSensorPerformanceControlConfig(SensorPerfControlConfig),
    GetAvailableWwanPosition { transaction_id: u32 },
    GetBestAvailablePosition { transaction_id: u32 },
    SetEngineLock(EngineLock),
    GetEngineLock,
    SetXtraVersionCheck(XtraVersionCheck),
    InjectSuplCertificate { id: u8, data: Bytes },
    DeleteSuplCertificate { id: u8 },
    SetGnssConstellReportConfig(ConstellationReportConfig),
    GetSupportedFeature,
    QueryAonConfig { transaction_id: u32 },
}

impl EngineRequest {
    pub fn id(&self) -> MessageId {
        match self {
            EngineRequest::SetOperationMode(_) => MessageId::SetOperationMode,
            EngineRequest::Start(_) => MessageId::Start,
            EngineRequest::Stop { .. } => MessageId::Stop,
            EngineRequest::InjectUtcTime { .. } => MessageId::InjectUtcTime,
            EngineRequest::InjectPosition(_) => MessageId::InjectPosition,
            EngineRequest::DeleteGnssServiceData(_) => MessageId::DeleteGnssServiceData,
            EngineRequest::DeleteAssistData(_) => MessageId::DeleteAssistData,
            EngineRequest::NiUserResponse(_) => MessageId::NiUserResponse,
            EngineRequest::SetServer(_) => MessageId::SetServer,
            EngineRequest::InjectPredictedOrbitsData(_) => MessageId::InjectPredictedOrbitsData,
            EngineRequest::GetPredictedOrbitsDataSource => MessageId::GetPredictedOrbitsDataSource,
            EngineRequest::InformLocationServerConnStatus(_) => {
                MessageId::InformLocationServerConnStatus
            }
            EngineRequest::SetProtocolConfigParameters(_) => MessageId::SetProtocolConfigParameters,
            EngineRequest::SetNmeaTypes(_) => MessageId::SetNmeaTypes,
            EngineRequest::SetSensorControlConfig(_) => MessageId::SetSensorControlConfig,
            EngineRequest::SetSensorProperties(_) => MessageId::SetSensorProperties,
            EngineRequest::SetSensorPerformanceControlConfig(_) => {
                MessageId::SetSensorPerformanceControlConfig
            }
            EngineRequest::GetAvailableWwanPosition { .. } => MessageId::GetAvailableWwanPosition,
            EngineRequest::GetBestAvailablePosition { .. } => MessageId::GetBestAvailablePosition,
            EngineRequest::SetEngineLock(_) => MessageId::SetEngineLock,
            EngineRequest::GetEngineLock => MessageId::GetEngineLock,
            EngineRequest::SetXtraVersionCheck(_) => MessageId::SetXtraVersionCheck,
            EngineRequest::InjectSuplCertificate { .. } => MessageId::InjectSuplCertificate,
            EngineRequest::DeleteSuplCertificate { .. } => MessageId::DeleteSuplCertificate,
            EngineRequest::SetGnssConstellReportConfig(_) => MessageId::SetGnssConstellReportConfig,
            EngineRequest::GetSupportedFeature => MessageId::GetSupportedFeature,
            EngineRequest::QueryAonConfig { .. } => MessageId::QueryAonConfig,
        }
    }
}
