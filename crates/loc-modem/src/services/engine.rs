//! Sensor assistance, zero-power positions and report configuration

use loc_core::{
    ConstellationSet, LocError, LocResult, SensorPerfControlConfig, SensorProperties,
    SensorProvider, TechMask, ZppFix,
};
use tracing::{debug, warn};

use super::LocService;
use crate::convert::convert_zpp;
use crate::transport::ClientHandle;
use crate::wire::{
    ConstellationReportConfig, EngineRequest, EngineResponse, ResponsePayload,
    SensorControlRequest, SensorsUsage, ZppPosition, DEFAULT_SESSION_ID,
};

impl LocService {
    /// Enable or disable sensor assistance. `provider` is the framework's
    /// integer provider setting.
    pub async fn set_sensor_control_config(
        &self,
        handle: ClientHandle,
        disabled: bool,
        provider: i32,
    ) -> LocResult<()> {
        let request = SensorControlRequest {
            sensors_usage: if disabled {
                SensorsUsage::Disable
            } else {
                SensorsUsage::Enable
            },
            sensor_provider: SensorProvider::from_setting(provider),
        };
        debug!(?request, "Setting sensor control configuration");
        self.sync
            .request(handle, EngineRequest::SetSensorControlConfig(request))
            .await
            .map(|_| ())
    }

    pub async fn set_sensor_properties(
        &self,
        handle: ClientHandle,
        properties: SensorProperties,
    ) -> LocResult<()> {
        self.sync
            .request(handle, EngineRequest::SetSensorProperties(properties))
            .await
            .map(|_| ())
    }

    pub async fn set_sensor_perf_control_config(
        &self,
        handle: ClientHandle,
        config: SensorPerfControlConfig,
    ) -> LocResult<()> {
        self.sync
            .request(handle, EngineRequest::SetSensorPerformanceControlConfig(config))
            .await
            .map(|_| ())
    }

    /// Restrict SV measurement and polynomial reporting to `constellations`
    pub async fn set_sv_measurement_constellation(
        &self,
        handle: ClientHandle,
        constellations: ConstellationSet,
    ) -> LocResult<()> {
        let request = EngineRequest::SetGnssConstellReportConfig(ConstellationReportConfig {
            measurement: Some(constellations),
            sv_polynomial: Some(constellations),
        });
        self.sync
            .request(handle, request)
            .await
            .map(|_| ())
            .map_err(|e| LocError::failure(format!("constellation report config: {}", e)))
    }

    /// Zero-power fix from the WWAN position.
    ///
    /// When the engine has no WWAN position, the best available position is
    /// used instead, but only if it was derived from cell information.
    pub async fn get_wwan_zpp_fix(&self, handle: ClientHandle) -> LocResult<ZppFix> {
        let request = EngineRequest::GetAvailableWwanPosition {
            transaction_id: u32::from(DEFAULT_SESSION_ID),
        };
        match self.sync.request(handle, request).await {
            Ok(response) => self.zpp_fix(&zpp_position(response)?),
            Err(e) => {
                debug!(error = %e, "No WWAN position, falling back to best available");
                match self.get_best_available_zpp_fix(handle).await {
                    Ok(fix) if fix.tech_mask.contains(TechMask::CELLID) => Ok(fix),
                    Ok(fix) => {
                        warn!(tech_mask = ?fix.tech_mask, "Best available position is not cell based");
                        Err(LocError::failure("best available position not derived from cell data"))
                    }
                    Err(e) => Err(LocError::failure(format!("no zero-power position: {}", e))),
                }
            }
        }
    }

    /// Best position the engine currently has, with its technology source
    pub async fn get_best_available_zpp_fix(&self, handle: ClientHandle) -> LocResult<ZppFix> {
        let request = EngineRequest::GetBestAvailablePosition {
            transaction_id: u32::from(DEFAULT_SESSION_ID),
        };
        let response = self.sync.request(handle, request).await?;
        self.zpp_fix(&zpp_position(response)?)
    }

    /// Latitude, longitude and accuracy are required. A missing UTC
    /// timestamp is filled from the wall clock.
    fn zpp_fix(&self, position: &ZppPosition) -> LocResult<ZppFix> {
        let mut fix = convert_zpp(position)
            .filter(|fix| fix.location.accuracy.is_some())
            .ok_or_else(|| LocError::failure("zero-power position incomplete"))?;
        if fix.location.timestamp_ms.is_none() {
            fix.location.timestamp_ms = Some(self.clock.utc_now_ms());
        }
        Ok(fix)
    }
}

fn zpp_position(response: EngineResponse) -> LocResult<ZppPosition> {
    match response.payload {
        ResponsePayload::ZppPosition(position) => Ok(position),
        _ => Err(LocError::failure("response carries no position")),
    }
}
