//! Event indications delivered asynchronously by the engine

use bitflags::bitflags;
use loc_core::{
    ClockFrequency, Dop, GloTime, InterSystemBias, MeasurementStatus, Reliability,
    SvSearchStatus, SystemTime, SystemTimeExt, SvDirection, SvTimeSpeed,
};

use super::MessageId;

/// Constellation identifier used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SvSystem {
    Gps,
    Galileo,
    Sbas,
    Compass,
    Glonass,
    Bds,
    Qzss,
}

/// Session status carried by a position indication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionSessionStatus {
    #[default]
    Success,
    InProgress,
    GeneralFailure,
    Timeout,
    UserEnd,
    BadParameter,
    PhoneOffline,
    EngineLocked,
}

/// Position indication
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionReportInd {
    pub session_status: PositionSessionStatus,
    pub session_id: u8,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hor_unc_circular: Option<f32>,
    pub hor_unc_ellipse_semi_minor: Option<f32>,
    pub hor_unc_ellipse_semi_major: Option<f32>,
    pub hor_unc_ellipse_orient_azimuth: Option<f32>,
    /// Horizontal confidence in percent
    pub hor_confidence: Option<u8>,
    pub hor_reliability: Option<Reliability>,
    pub speed_horizontal: Option<f32>,
    pub speed_unc: Option<f32>,
    pub altitude_wrt_ellipsoid: Option<f32>,
    pub altitude_wrt_mean_sea_level: Option<f32>,
    pub vert_unc: Option<f32>,
    pub vert_reliability: Option<Reliability>,
    pub heading: Option<f32>,
    pub heading_unc: Option<f32>,
    pub magnetic_deviation: Option<f32>,
    pub technology_mask: Option<u32>,
    pub dop: Option<Dop>,
    /// UTC timestamp in milliseconds
    pub timestamp_utc: Option<u64>,
    /// Engine-numbered ids of satellites used in the fix
    pub gnss_sv_used_list: Option<Vec<u16>>,
}

bitflags! {
    /// Data the engine holds for a satellite
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SvInfoMask: u8 {
        const HAS_EPHEMERIS = 0x01;
        const HAS_ALMANAC = 0x02;
    }
}

/// One satellite of a satellite-info indication
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WireSvInfo {
    pub system: Option<SvSystem>,
    pub gnss_sv_id: Option<u16>,
    pub health_status: Option<u8>,
    pub sv_status: Option<SvSearchStatus>,
    pub sv_info_mask: Option<SvInfoMask>,
    pub elevation: Option<f32>,
    pub azimuth: Option<f32>,
    pub snr: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvInfoInd {
    pub sv_list: Vec<WireSvInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NmeaInd {
    pub nmea: String,
}

/// Power state reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStateInd {
    On,
    Off,
    Unknown(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixSessionStateInd {
    Started,
    Finished,
    Unknown(u32),
}

/// Engine asks for predicted orbit data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InjectPredictedOrbitsReqInd {
    pub server_list: Vec<String>,
    pub max_file_size: u32,
    pub max_part_size: u32,
}

/// Data connection type requested by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WwanType {
    Internet,
    Agnss,
    AgnssEmergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRequestType {
    Open,
    Close,
}

/// Engine asks for a data connection to a location server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConnReqInd {
    pub conn_handle: u32,
    pub request_type: ServerRequestType,
    pub wwan_type: Option<WwanType>,
}

/// Privacy handling requested for an NI session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NiNotifyVerifyType {
    NoNotifyNoVerify,
    NotifyOnly,
    NotifyVerifyAllowNoResp,
    NotifyVerifyNotAllowNoResp,
    PrivacyOverride,
}

/// Text coding scheme of NI payload strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCodingScheme {
    SuplUtf8,
    SuplUcs2,
    SuplGsmDefault,
    SsLanguageUnspec,
    Other(u8),
}

/// Voice (Vx) NI payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NiVxPayload {
    pub pos_qos_incl: bool,
    pub pos_qos: u8,
    pub num_fixes: u32,
    pub time_between_fixes: u32,
    pub requestor_id: Vec<u8>,
    pub user_resp_timer_s: u16,
}

/// String with a SUPL format tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedString {
    pub format_type: u8,
    pub data: Vec<u8>,
}

/// SUPL NI payload; absent optional parts are `None`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NiSuplPayload {
    pub server_url: Option<String>,
    pub session_id: Option<u32>,
    pub hash: Option<u64>,
    pub client_name: Option<FormattedString>,
    pub requestor_id: Option<FormattedString>,
    pub data_coding_scheme: Option<DataCodingScheme>,
    pub user_response_timer_s: Option<u16>,
}

/// UMTS control-plane NI payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NiUmtsCpPayload {
    pub invoke_id: u8,
    pub data_coding_scheme: DataCodingScheme,
    pub notification_text: Vec<u8>,
    pub client_address: Vec<u8>,
    pub requestor_id: Vec<u8>,
    pub requestor_id_dcs: DataCodingScheme,
    pub codeword_string: Vec<u8>,
    pub user_response_timer_s: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NiVxServiceInteraction {
    pub vx_req: NiVxPayload,
    pub service_interaction_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NiSuplVer2Ext {
    pub supported_networks_mask: u16,
    pub trigger_type: u8,
    pub gnss_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NiSuplEmergency {
    pub eslp_url: String,
}

/// Network-initiated notify/verify request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NiNotifyVerifyInd {
    pub notification_type: NiNotifyVerifyType,
    pub vx: Option<NiVxPayload>,
    pub supl: Option<NiSuplPayload>,
    pub umts_cp: Option<NiUmtsCpPayload>,
    pub vx_service_interaction: Option<NiVxServiceInteraction>,
    pub supl_ver2_ext: Option<NiSuplVer2Ext>,
    pub supl_emergency: Option<NiSuplEmergency>,
}

impl NiNotifyVerifyInd {
    pub fn new(notification_type: NiNotifyVerifyType) -> Self {
        Self {
            notification_type,
            vx: None,
            supl: None,
            umts_cp: None,
            vx_service_interaction: None,
            supl_ver2_ext: None,
            supl_emergency: None,
        }
    }
}

/// One satellite of a raw measurement indication
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WireSvMeasurement {
    pub gnss_sv_id: u16,
    pub glo_frequency: u8,
    pub sv_status: SvSearchStatus,
    pub health_status: Option<u8>,
    pub sv_info_mask: u8,
    pub measurement_status: MeasurementStatus,
    /// Which bits of `measurement_status` the engine vouches for
    pub valid_meas_status_mask: MeasurementStatus,
    pub cno: u16,
    pub glo_rf_loss: u16,
    pub loss_of_lock: Option<bool>,
    pub meas_latency: i32,
    pub sv_time_speed: SvTimeSpeed,
    pub multipath_estimate: Option<f32>,
    pub fine_speed: Option<f32>,
    pub fine_speed_unc: Option<f32>,
    pub carrier_phase: Option<f64>,
    pub direction: Option<SvDirection>,
    pub cycle_slip_count: Option<u8>,
}

/// Leap second information; only usable with zero uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireLeapSecond {
    pub leap_sec: u8,
    pub leap_sec_unc: u8,
}

/// Raw measurement indication
#[derive(Debug, Clone, PartialEq)]
pub struct SvMeasurementInd {
    pub seq_num: u8,
    pub max_message_num: u8,
    pub system: SvSystem,
    pub rcv_clock_frequency: Option<ClockFrequency>,
    pub leap_second: Option<WireLeapSecond>,
    pub gps_glo_inter_system_bias: Option<InterSystemBias>,
    pub gps_bds_inter_system_bias: Option<InterSystemBias>,
    pub gps_gal_inter_system_bias: Option<InterSystemBias>,
    pub bds_glo_inter_system_bias: Option<InterSystemBias>,
    pub gal_glo_inter_system_bias: Option<InterSystemBias>,
    pub gal_bds_inter_system_bias: Option<InterSystemBias>,
    pub system_time: Option<SystemTime>,
    pub glo_time: Option<GloTime>,
    pub system_time_ext: Option<SystemTimeExt>,
    pub num_clock_resets: Option<u32>,
    pub sv_measurements: Vec<WireSvMeasurement>,
}

impl SvMeasurementInd {
    pub fn new(system: SvSystem) -> Self {
        Self {
            seq_num: 1,
            max_message_num: 1,
            system,
            rcv_clock_frequency: None,
            leap_second: None,
            gps_glo_inter_system_bias: None,
            gps_bds_inter_system_bias: None,
            gps_gal_inter_system_bias: None,
            bds_glo_inter_system_bias: None,
            gal_glo_inter_system_bias: None,
            gal_bds_inter_system_bias: None,
            system_time: None,
            glo_time: None,
            system_time_ext: None,
            num_clock_resets: None,
            sv_measurements: Vec::new(),
        }
    }
}

/// Satellite polynomial indication; optional fields are `None` when absent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvPolynomialInd {
    pub gnss_sv_id: u16,
    pub t0: f64,
    pub sv_poly_flags: Option<u8>,
    pub glo_frequency: Option<i8>,
    pub iode: Option<u16>,
    pub sv_pos_unc: Option<f32>,
    pub poly_coeff_xyz0: Option<[f64; 4]>,
    pub poly_coeff_xyzn: Option<[f64; 9]>,
    pub poly_coeff_other: Option<[f32; 4]>,
    pub iono_delay: Option<f32>,
    pub iono_dot: Option<f32>,
    pub sbas_iono_delay: Option<f32>,
    pub sbas_iono_dot: Option<f32>,
    pub tropo_delay: Option<f32>,
    pub elevation: Option<f32>,
    pub elevation_dot: Option<f32>,
    pub elevation_unc: Option<f32>,
    pub velocity_coeff: Option<[f64; 12]>,
    pub enhanced_iod: Option<u32>,
}

/// Asynchronous event indication from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PositionReport(Box<PositionReportInd>),
    SvInfo(SvInfoInd),
    Nmea(NmeaInd),
    NiNotifyVerify(Box<NiNotifyVerifyInd>),
    InjectTimeReq,
    InjectPredictedOrbitsReq(InjectPredictedOrbitsReqInd),
    InjectPositionReq,
    EngineState(EngineStateInd),
    FixSessionState(FixSessionStateInd),
    LocationServerConnectionReq(ServerConnReqInd),
    GnssMeasurement(Box<SvMeasurementInd>),
    SvPolynomial(Box<SvPolynomialInd>),
}

impl EngineEvent {
    pub fn id(&self) -> MessageId {
        match self {
            EngineEvent::PositionReport(_) => MessageId::EventPositionReport,
            EngineEvent::SvInfo(_) => MessageId::EventGnssSvInfo,
            EngineEvent::Nmea(_) => MessageId::EventNmea,
            EngineEvent::NiNotifyVerify(_) => MessageId::EventNiNotifyVerifyReq,
            EngineEvent::InjectTimeReq => MessageId::EventInjectTimeReq,
            EngineEvent::InjectPredictedOrbitsReq(_) => MessageId::EventInjectPredictedOrbitsReq,
            EngineEvent::InjectPositionReq => MessageId::EventInjectPositionReq,
            EngineEvent::EngineState(_) => MessageId::EventEngineState,
            EngineEvent::FixSessionState(_) => MessageId::EventFixSessionState,
            EngineEvent::LocationServerConnectionReq(_) => {
                MessageId::EventLocationServerConnectionReq
            }
            EngineEvent::GnssMeasurement(_) => MessageId::EventGnssMeasurementReport,
            EngineEvent::SvPolynomial(_) => MessageId::EventSvPolynomialReport,
        }
    }
}
