//! Aiding data deletion with request-generation negotiation
//!
//! Engines either understand the current per-constellation delete request
//! or only the legacy GPS-centric one. The strategy tries the current
//! request first and falls back to the legacy one when the engine cannot
//! handle it. An `Unsupported` answer demotes the strategy to the legacy
//! request until it is reset on the next open.

use loc_core::{AidingData, LocError, LocResult};
use tracing::{debug, info, warn};

use crate::sync_req::SyncClient;
use crate::transport::ClientHandle;
use crate::wire::{
    CellDbMask, DeleteAssistDataRequest, DeleteCommonDataMask, DeleteGnssDataMask,
    DeleteGnssServiceDataRequest, DeleteSatDataMask, DeleteSvInfo, DeleteSvInfoMask,
    EngineRequest, GnssSystemMask, SvSystem,
};

/// GPS satellites addressed by the legacy request
const LEGACY_GPS_SV_COUNT: u16 = 32;
const LEGACY_GPS_SV_OFFSET: u16 = 1;

/// Request generation used for aiding data deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteApi {
    #[default]
    Current,
    Legacy,
}

/// Build the current-generation delete request
pub fn current_request(flags: AidingData) -> DeleteGnssServiceDataRequest {
    if flags.is_delete_all() {
        return DeleteGnssServiceDataRequest {
            delete_all: true,
            ..Default::default()
        };
    }

    let sat_map = [
        (AidingData::EPHEMERIS, DeleteSatDataMask::EPH),
        (AidingData::ALMANAC, DeleteSatDataMask::ALM),
        (AidingData::TIME, DeleteSatDataMask::TIME),
        (AidingData::IONO, DeleteSatDataMask::IONO),
        (AidingData::HEALTH, DeleteSatDataMask::SVHEALTH),
        (AidingData::SVDIR, DeleteSatDataMask::SVDIR),
        (AidingData::SVSTEER, DeleteSatDataMask::SVSTEER),
        (AidingData::SADATA, DeleteSatDataMask::SA_DATA),
    ];
    let common_map = [
        (AidingData::POSITION, DeleteCommonDataMask::POS),
        (AidingData::TIME, DeleteCommonDataMask::TIME),
        (AidingData::UTC, DeleteCommonDataMask::UTC),
        (AidingData::RTI, DeleteCommonDataMask::RTI),
    ];

    let sat = sat_map
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .fold(DeleteSatDataMask::empty(), |acc, (_, bit)| acc | *bit);
    let common = common_map
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .fold(DeleteCommonDataMask::empty(), |acc, (_, bit)| acc | *bit);

    DeleteGnssServiceDataRequest {
        delete_all: false,
        sat_data: (!sat.is_empty()).then_some((GnssSystemMask::all(), sat)),
        common_data: (!common.is_empty()).then_some(common),
        cell_db: flags.contains(AidingData::CELLDB_INFO).then_some(CellDbMask::all()),
    }
}

/// Build the legacy delete request
pub fn legacy_request(flags: AidingData) -> DeleteAssistDataRequest {
    if flags.is_delete_all() {
        return DeleteAssistDataRequest {
            delete_all: true,
            ..Default::default()
        };
    }

    let mut sv_mask = DeleteSvInfoMask::empty();
    if flags.contains(AidingData::EPHEMERIS) {
        sv_mask |= DeleteSvInfoMask::EPHEMERIS;
    }
    if flags.contains(AidingData::ALMANAC) {
        sv_mask |= DeleteSvInfoMask::ALMANAC;
    }
    let sv_info = if sv_mask.is_empty() {
        Vec::new()
    } else {
        (0..LEGACY_GPS_SV_COUNT)
            .map(|i| DeleteSvInfo {
                gnss_sv_id: LEGACY_GPS_SV_OFFSET + i,
                system: SvSystem::Gps,
                delete_mask: sv_mask,
            })
            .collect()
    };

    let data_map = [
        (AidingData::POSITION, DeleteGnssDataMask::POSITION),
        (AidingData::TIME, DeleteGnssDataMask::TIME),
        (AidingData::IONO, DeleteGnssDataMask::IONO),
        (AidingData::UTC, DeleteGnssDataMask::UTC),
        (AidingData::HEALTH, DeleteGnssDataMask::HEALTH),
        (AidingData::SVDIR, DeleteGnssDataMask::GPS_SVDIR),
        (AidingData::SADATA, DeleteGnssDataMask::SADATA),
        (AidingData::RTI, DeleteGnssDataMask::RTI),
    ];
    let data = data_map
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .fold(DeleteGnssDataMask::empty(), |acc, (_, bit)| acc | *bit);

    DeleteAssistDataRequest {
        delete_all: false,
        sv_info,
        gnss_data: (!data.is_empty()).then_some(data),
        cell_db: flags.contains(AidingData::CELLDB_INFO).then_some(CellDbMask::all()),
    }
}

/// Remembers which delete request generation the engine accepts
#[derive(Debug, Default)]
pub struct DeleteAidingStrategy {
    api: DeleteApi,
}

impl DeleteAidingStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api(&self) -> DeleteApi {
        self.api
    }

    /// Forget a previous demotion
    pub fn reset(&mut self) {
        self.api = DeleteApi::Current;
    }

    pub async fn delete(
        &mut self,
        sync: &SyncClient,
        handle: ClientHandle,
        flags: AidingData,
    ) -> LocResult<()> {
        if self.api == DeleteApi::Current {
            let request = EngineRequest::DeleteGnssServiceData(current_request(flags));
            match sync.request(handle, request).await {
                Ok(_) => return Ok(()),
                Err(e) if e.allows_fallback() => {
                    if e == LocError::Unsupported {
                        info!("Engine lacks the current delete request, using legacy from now on");
                        self.api = DeleteApi::Legacy;
                    } else {
                        debug!(error = %e, "Current delete request failed, retrying with legacy");
                    }
                }
                Err(e) => {
                    warn!(error = %e, ?flags, "Aiding data deletion failed");
                    return Err(e);
                }
            }
        }

        let request = EngineRequest::DeleteAssistData(legacy_request(flags));
        sync.request(handle, request).await.map(|_| ()).map_err(|e| {
            warn!(error = %e, ?flags, "Legacy aiding data deletion failed");
            e
        })
    }
}
