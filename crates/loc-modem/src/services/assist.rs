//! Assistance data: time, coarse position and predicted orbits

use bytes::Bytes;
use loc_core::{LocError, LocResult, XtraServers, XtraVersionCheck};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::LocService;
use crate::convert::xtra_servers;
use crate::transport::ClientHandle;
use crate::wire::{EngineRequest, InjectPositionRequest, PredictedOrbitsPart, ResponsePayload};

/// Floor applied to the circular uncertainty of an injected position
const MIN_INJECTED_UNC_M: f32 = 1000.0;
/// Confidence assumed for injected positions (one standard deviation)
const INJECTED_CONFIDENCE: u8 = 68;

/// Predicted-orbits injection stopped before the last part
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("XTRA injection failed at part {part}/{total_parts} after {injected} bytes: {source}")]
pub struct XtraInjectError {
    /// Bytes accepted by the engine before the failure
    pub injected: usize,
    /// 1-based part that failed
    pub part: u16,
    pub total_parts: u16,
    pub source: LocError,
}

impl LocService {
    /// Inject UTC time, advanced by the time elapsed since `reference_ms`
    /// on the boot clock
    pub async fn set_time(
        &self,
        handle: ClientHandle,
        utc_ms: u64,
        reference_ms: u64,
        uncertainty_ms: u32,
    ) -> LocResult<()> {
        let elapsed = self.clock.since_boot().as_millis() as i128 - i128::from(reference_ms);
        let time_utc_ms = u64::try_from(i128::from(utc_ms) + elapsed).unwrap_or(0);
        debug!(time_utc_ms, uncertainty_ms, "Injecting UTC time");

        let request = EngineRequest::InjectUtcTime {
            time_utc_ms,
            time_unc_ms: uncertainty_ms,
        };
        self.sync.request(handle, request).await.map(|_| ())
    }

    /// Inject a coarse position with `accuracy` meters of uncertainty
    pub async fn inject_position(
        &self,
        handle: ClientHandle,
        latitude: f64,
        longitude: f64,
        accuracy: f32,
    ) -> LocResult<()> {
        let request = InjectPositionRequest {
            latitude,
            longitude,
            hor_unc_circular: accuracy.max(MIN_INJECTED_UNC_M),
            hor_confidence: INJECTED_CONFIDENCE,
            raw_hor_unc_circular: accuracy,
            raw_hor_confidence: INJECTED_CONFIDENCE,
            timestamp_utc_ms: self.clock.utc_now_ms(),
        };
        debug!(
            latitude,
            longitude,
            unc = request.hor_unc_circular,
            raw_unc = request.raw_hor_unc_circular,
            "Injecting position"
        );
        self.sync
            .request(handle, EngineRequest::InjectPosition(request))
            .await
            .map(|_| ())
    }

    /// Inject predicted-orbits data in parts of the configured length.
    ///
    /// Each part must be acknowledged with its own part number. The first
    /// failed or mismatched part aborts the injection.
    pub async fn set_xtra_data(
        &self,
        handle: ClientHandle,
        data: Bytes,
    ) -> Result<usize, XtraInjectError> {
        if data.is_empty() {
            return Err(XtraInjectError {
                injected: 0,
                part: 0,
                total_parts: 0,
                source: LocError::invalid("empty XTRA data"),
            });
        }

        let total_size = data.len();
        let too_large = |source| XtraInjectError {
            injected: 0,
            part: 0,
            total_parts: 0,
            source,
        };
        let total_parts = u16::try_from((total_size - 1) / self.xtra_part_len + 1)
            .map_err(|_| too_large(LocError::invalid("XTRA data has too many parts")))?;
        let total_size_u32 = u32::try_from(total_size)
            .map_err(|_| too_large(LocError::invalid("XTRA data too large")))?;

        let mut injected = 0usize;
        for (index, chunk) in data.chunks(self.xtra_part_len).enumerate() {
            let part_num = index as u16 + 1;
            let part_len = chunk.len();
            debug!(part_num, total_parts, part_len, injected, "Injecting XTRA part");

            let request = EngineRequest::InjectPredictedOrbitsData(PredictedOrbitsPart {
                total_size: total_size_u32,
                total_parts,
                part_num,
                part_data: data.slice(injected..injected + part_len),
            });

            let result = match self.sync.request(handle, request).await {
                Ok(response) => match response.payload {
                    ResponsePayload::PredictedOrbitsPart { part_num: echoed } if echoed == part_num => {
                        Ok(())
                    }
                    ResponsePayload::PredictedOrbitsPart { part_num: echoed } => Err(LocError::failure(
                        format!("engine acknowledged part {} instead of {}", echoed, part_num),
                    )),
                    _ => Err(LocError::failure("XTRA acknowledgement without part number")),
                },
                Err(e) => Err(e),
            };

            if let Err(source) = result {
                warn!(part_num, total_parts, injected, error = %source, "XTRA injection aborted");
                return Err(XtraInjectError {
                    injected,
                    part: part_num,
                    total_parts,
                    source,
                });
            }
            injected += part_len;
        }

        info!(injected, total_parts, "XTRA data injected");
        Ok(injected)
    }

    /// Query the predicted-orbits download servers
    pub async fn request_xtra_server(&self, handle: ClientHandle) -> LocResult<XtraServers> {
        let response = self
            .sync
            .request(handle, EngineRequest::GetPredictedOrbitsDataSource)
            .await?;
        match response.payload {
            ResponsePayload::PredictedOrbitsSource { server_list } => Ok(xtra_servers(&server_list)),
            _ => Err(LocError::failure("XTRA source response without server list")),
        }
    }

    pub async fn set_xtra_version_check(
        &self,
        handle: ClientHandle,
        check: XtraVersionCheck,
    ) -> LocResult<()> {
        self.sync
            .request(handle, EngineRequest::SetXtraVersionCheck(check))
            .await
            .map(|_| ())
            .map_err(|e| LocError::failure(format!("XTRA version check: {}", e)))
    }
}
