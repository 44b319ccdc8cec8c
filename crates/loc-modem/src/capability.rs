//! Engine capability cache
//!
//! Filled once when the client is first opened: which optional messages
//! the engine implements, its always-on batching capabilities, the
//! supported-feature bit list and whether raw measurement reporting works.

use bitflags::bitflags;
use loc_core::{ConstellationSet, LocError};
use tracing::{debug, info, warn};

use crate::sync_req::SyncClient;
use crate::transport::{ClientHandle, TransportClient};
use crate::wire::{
    AonCapability, ConstellationReportConfig, EngineRequest, MessageId, ResponsePayload,
    WireEventMask, DEFAULT_SESSION_ID,
};

bitflags! {
    /// Optional engine messages and capabilities
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SupportedMessages: u32 {
        const LOCATION_BATCHING = 1 << 0;
        const BATCHED_GEOFENCE_BREACH = 1 << 1;
        const DISTANCE_BASED_TRACKING = 1 << 2;
        const ADAPTIVE_LOCATION_BATCHING = 1 << 3;
        const DISTANCE_BASED_LOCATION_BATCHING = 1 << 4;
        const UPDATE_TBF_ON_THE_FLY = 1 << 5;
    }
}

/// Messages probed with a support check, in probe order
const PROBED_MESSAGES: [(MessageId, SupportedMessages); 3] = [
    (MessageId::LocationBatching, SupportedMessages::LOCATION_BATCHING),
    (MessageId::BatchedGeofenceBreach, SupportedMessages::BATCHED_GEOFENCE_BREACH),
    (MessageId::DistanceBasedTracking, SupportedMessages::DISTANCE_BASED_TRACKING),
];

/// Tri-state result of the raw measurement support probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementSupport {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityCache {
    messages: SupportedMessages,
    features: Vec<u8>,
    measurement: MeasurementSupport,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> SupportedMessages {
        self.messages
    }

    pub fn is_message_supported(&self, msg: SupportedMessages) -> bool {
        !msg.is_empty() && self.messages.contains(msg)
    }

    /// Look up bit `feature` of the engine's supported-feature list
    pub fn is_feature_supported(&self, feature: usize) -> bool {
        self.features
            .get(feature / 8)
            .is_some_and(|byte| byte & (1 << (feature % 8)) != 0)
    }

    pub fn measurement_support(&self) -> MeasurementSupport {
        self.measurement
    }

    pub fn gnss_measurement_supported(&self) -> bool {
        self.measurement == MeasurementSupport::Supported
    }

    /// Forget the measurement probe result so the next open probes again
    pub fn reset_measurement_support(&mut self) {
        self.measurement = MeasurementSupport::Unknown;
    }

    pub fn set_messages(&mut self, messages: SupportedMessages) {
        self.messages = messages;
    }

    pub fn set_features(&mut self, features: Vec<u8>) {
        self.features = features;
    }

    pub fn set_measurement_support(&mut self, support: MeasurementSupport) {
        self.measurement = support;
    }
}

/// Map always-on capabilities onto supported message bits
pub fn aon_messages(aon: AonCapability) -> SupportedMessages {
    let mut messages = SupportedMessages::empty();
    if aon.contains(AonCapability::AUTO_BATCHING) {
        messages |= SupportedMessages::ADAPTIVE_LOCATION_BATCHING;
    }
    if aon.contains(AonCapability::DISTANCE_BASED_BATCHING) {
        messages |= SupportedMessages::DISTANCE_BASED_LOCATION_BATCHING;
    }
    if aon.contains(AonCapability::UPDATE_TBF_ON_THE_FLY) {
        messages |= SupportedMessages::UPDATE_TBF_ON_THE_FLY;
    }
    messages
}

/// Probe optional messages, always-on configuration and feature list.
///
/// Probe failures are logged and leave the corresponding capability unset.
pub async fn probe_capabilities(
    client: &TransportClient,
    sync: &SyncClient,
    handle: ClientHandle,
    cache: &mut CapabilityCache,
) {
    let ids: Vec<MessageId> = PROBED_MESSAGES.iter().map(|(id, _)| *id).collect();
    let mut messages = match client.supported_messages(&ids).await {
        Ok(flags) => PROBED_MESSAGES
            .iter()
            .zip(flags)
            .filter(|(_, supported)| *supported)
            .fold(SupportedMessages::empty(), |acc, ((_, bit), _)| acc | *bit),
        Err(e) => {
            warn!(error = %e, "Supported message check failed");
            SupportedMessages::empty()
        }
    };

    if messages.contains(SupportedMessages::LOCATION_BATCHING) {
        let request = EngineRequest::QueryAonConfig {
            transaction_id: u32::from(DEFAULT_SESSION_ID),
        };
        match sync.request(handle, request).await {
            Ok(response) => match response.payload {
                ResponsePayload::AonConfig(Some(aon)) => {
                    debug!(?aon, "Always-on capabilities");
                    messages |= aon_messages(aon);
                }
                _ => debug!("Always-on configuration carries no capability"),
            },
            Err(LocError::Unsupported) => debug!("Always-on configuration query unsupported"),
            Err(e) => warn!(error = %e, "Always-on configuration query failed"),
        }
    }

    info!(?messages, "Supported optional messages");
    cache.set_messages(messages);

    match sync.request(handle, EngineRequest::GetSupportedFeature).await {
        Ok(response) => {
            if let ResponsePayload::SupportedFeature(features) = response.payload {
                if !features.is_empty() {
                    debug!(features = %hex::encode(&features), "Supported features");
                    cache.set_features(features);
                }
            }
        }
        Err(e) => warn!(error = %e, "Supported feature query failed"),
    }
}

/// Probe raw measurement support once, only when position reports are
/// subscribed
pub async fn probe_measurement_support(
    sync: &SyncClient,
    handle: ClientHandle,
    wire_mask: WireEventMask,
    cache: &mut CapabilityCache,
) {
    if cache.measurement_support() != MeasurementSupport::Unknown
        || !wire_mask.contains(WireEventMask::POSITION_REPORT)
    {
        return;
    }

    let request = EngineRequest::SetGnssConstellReportConfig(ConstellationReportConfig {
        measurement: Some(ConstellationSet::GPS),
        sv_polynomial: None,
    });
    let support = match sync.request(handle, request).await {
        Ok(_) => MeasurementSupport::Supported,
        Err(e) => {
            debug!(error = %e, "Measurement reporting not supported");
            MeasurementSupport::Unsupported
        }
    };
    info!(?support, "Measurement support probed");
    cache.set_measurement_support(support);
}
