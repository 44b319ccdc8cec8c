//! Typed model of the location engine's request/indication protocol
//!
//! Requests, responses and event indications are represented as plain Rust
//! values; serializing them onto a specific IPC channel is the job of a
//! [`LocTransport`](crate::transport::LocTransport) implementation.

mod indications;
mod requests;
mod responses;

pub use indications::*;
pub use requests::*;
pub use responses::*;

use bitflags::bitflags;
use loc_core::{LocError, LocResult};

/// Identifier shared by a request, its response indication and event indications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    // Session control
    SetOperationMode,
    Start,
    Stop,

    // Assistance data
    InjectUtcTime,
    InjectPosition,
    DeleteGnssServiceData,
    DeleteAssistData,
    InjectPredictedOrbitsData,
    GetPredictedOrbitsDataSource,
    SetXtraVersionCheck,
    InjectSuplCertificate,
    DeleteSuplCertificate,

    // AGPS and protocol configuration
    NiUserResponse,
    SetServer,
    InformLocationServerConnStatus,
    SetProtocolConfigParameters,
    SetNmeaTypes,

    // Sensors
    SetSensorControlConfig,
    SetSensorProperties,
    SetSensorPerformanceControlConfig,

    // Engine queries
    GetAvailableWwanPosition,
    GetBestAvailablePosition,
    SetEngineLock,
    GetEngineLock,
    SetGnssConstellReportConfig,
    GetSupportedFeature,
    QueryAonConfig,

    // Optional messages probed at open
    LocationBatching,
    BatchedGeofenceBreach,
    DistanceBasedTracking,

    // Event indications
    EventPositionReport,
    EventGnssSvInfo,
    EventNmea,
    EventNiNotifyVerifyReq,
    EventInjectTimeReq,
    EventInjectPredictedOrbitsReq,
    EventInjectPositionReq,
    EventEngineState,
    EventFixSessionState,
    EventLocationServerConnectionReq,
    EventGnssMeasurementReport,
    EventSvPolynomialReport,
}

/// Status carried in a response indication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicationStatus {
    #[default]
    Success,
    GeneralFailure,
    Unsupported,
    InvalidParameter,
    EngineBusy,
    PhoneOffline,
    Timeout,
    ConfigNotSupported,
    InsufficientMemory,
    MaxGeofenceProgrammed,
    XtraVersionCheckFailure,
    GnssDisabled,
}

impl IndicationStatus {
    pub fn is_success(&self) -> bool {
        *self == IndicationStatus::Success
    }

    /// Map an indication status onto the adapter's outcome taxonomy
    pub fn into_result(self) -> LocResult<()> {
        match self {
            IndicationStatus::Success => Ok(()),
            IndicationStatus::Unsupported | IndicationStatus::ConfigNotSupported => {
                Err(LocError::Unsupported)
            }
            IndicationStatus::InvalidParameter => {
                Err(LocError::invalid("rejected by engine"))
            }
            IndicationStatus::EngineBusy => Err(LocError::EngineBusy),
            IndicationStatus::PhoneOffline => Err(LocError::PhoneOffline),
            IndicationStatus::Timeout => Err(LocError::Timeout),
            other => Err(LocError::failure(format!("engine status {:?}", other))),
        }
    }
}

bitflags! {
    /// Engine-native event subscription bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WireEventMask: u64 {
        const POSITION_REPORT = 0x0000_0001;
        const GNSS_SV_INFO = 0x0000_0002;
        const NMEA = 0x0000_0004;
        const NI_NOTIFY_VERIFY_REQ = 0x0000_0008;
        const INJECT_TIME_REQ = 0x0000_0010;
        const INJECT_PREDICTED_ORBITS_REQ = 0x0000_0020;
        const INJECT_POSITION_REQ = 0x0000_0040;
        const ENGINE_STATE = 0x0000_0080;
        const FIX_SESSION_STATE = 0x0000_0100;
        const WIFI_REQ = 0x0000_0200;
        const SENSOR_STREAMING_READY_STATUS = 0x0000_0400;
        const TIME_SYNC_REQ = 0x0000_0800;
        const SET_SPI_STREAMING_REPORT = 0x0000_1000;
        const LOCATION_SERVER_CONNECTION_REQ = 0x0000_2000;
        const NI_GEOFENCE_NOTIFICATION = 0x0000_4000;
        const GEOFENCE_GEN_ALERT = 0x0000_8000;
        const GEOFENCE_BREACH_NOTIFICATION = 0x0001_0000;
        const PEDOMETER_CONTROL = 0x0002_0000;
        const MOTION_DATA_CONTROL = 0x0004_0000;
        const BATCH_FULL_NOTIFICATION = 0x0008_0000;
        const LIVE_BATCHED_POSITION_REPORT = 0x0010_0000;
        const INJECT_WIFI_AP_DATA_REQ = 0x0020_0000;
        const GEOFENCE_BATCH_BREACH_NOTIFICATION = 0x0040_0000;
        const GNSS_MEASUREMENT_REPORT = 0x0100_0000;
        const GNSS_SV_POLYNOMIAL_REPORT = 0x0200_0000;
        const GDT_UPLOAD_BEGIN_REQ = 0x0800_0000;
        const GDT_UPLOAD_END_REQ = 0x1000_0000;
        const GEOFENCE_BATCH_DWELL_NOTIFICATION = 0x2000_0000;
        const GET_TIME_ZONE_REQ = 0x4000_0000;
    }
}

/// Session id used for every fix session started by the adapter
pub const DEFAULT_SESSION_ID: u8 = 1;

/// Longest server URL accepted by the engine
pub const MAX_SERVER_ADDR_LENGTH: usize = 256;

/// Bounds of application credential strings in a start request
pub const MAX_APP_ID_NAME_LENGTH: usize = 32;
pub const MAX_APP_ID_PROVIDER_LENGTH: usize = 24;
