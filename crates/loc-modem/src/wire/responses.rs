//! Response indications to synchronous requests

use bitflags::bitflags;

use super::{EngineLock, IndicationStatus, MessageId};

bitflags! {
    /// Always-on capabilities reported by the engine
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AonCapability: u32 {
        const TIME_BASED_BATCHING = 0x01;
        const AUTO_BATCHING = 0x02;
        const DISTANCE_BASED_BATCHING = 0x04;
        const DISTANCE_BASED_TRACKING = 0x08;
        const UPDATE_TBF_ON_THE_FLY = 0x10;
    }
}

/// Position returned by the zero-power queries
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZppPosition {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hor_unc_circular: Option<f32>,
    pub hor_circular_confidence: Option<u8>,
    pub altitude_wrt_ellipsoid: Option<f32>,
    pub horizontal_speed: Option<f32>,
    pub heading: Option<f32>,
    pub technology_mask: Option<u32>,
    pub timestamp_utc: Option<u64>,
}

/// Payload of a response indication
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponsePayload {
    #[default]
    None,
    PredictedOrbitsPart {
        part_num: u16,
    },
    PredictedOrbitsSource {
        server_list: Vec<String>,
    },
    ZppPosition(ZppPosition),
    EngineLock(Option<EngineLock>),
    SupportedFeature(Vec<u8>),
    AonConfig(Option<AonCapability>),
}

/// Response indication matching a synchronous request
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    pub id: MessageId,
    pub status: IndicationStatus,
    pub payload: ResponsePayload,
}

impl EngineResponse {
    pub fn success(id: MessageId) -> Self {
        Self {
            id,
            status: IndicationStatus::Success,
            payload: ResponsePayload::None,
        }
    }

    pub fn with_status(id: MessageId, status: IndicationStatus) -> Self {
        Self {
            id,
            status,
            payload: ResponsePayload::None,
        }
    }

    pub fn with_payload(mut self, payload: ResponsePayload) -> Self {
        self.payload = payload;
        self
    }
}
