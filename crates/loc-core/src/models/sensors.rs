//! Sensor assistance configuration

use serde::{Deserialize, Serialize};

/// Sensor data provider for on-device sensor assistance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorProvider {
    /// Sensor core on the modem side
    Ssc,
    /// Native sensors streamed from the application processor
    Native,
}

impl SensorProvider {
    /// Maps the framework's integer provider setting
    pub fn from_setting(value: i32) -> Self {
        match value {
            1 | 4 => SensorProvider::Ssc,
            _ => SensorProvider::Native,
        }
    }
}

/// Sensor noise properties; absent fields are not sent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorProperties {
    pub gyro_bias_variance_random_walk: Option<f32>,
    pub accel_random_walk_spectral_density: Option<f32>,
    pub angle_random_walk_spectral_density: Option<f32>,
    pub rate_random_walk_spectral_density: Option<f32>,
    pub velocity_random_walk_spectral_density: Option<f32>,
}

/// Sensor sampling performance configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorPerfControlConfig {
    pub control_mode: u32,
    pub accel_samples_per_batch: u32,
    pub accel_batches_per_sec: u32,
    pub gyro_samples_per_batch: u32,
    pub gyro_batches_per_sec: u32,
    pub accel_samples_per_batch_high: u32,
    pub accel_batches_per_sec_high: u32,
    pub gyro_samples_per_batch_high: u32,
    pub gyro_batches_per_sec_high: u32,
    pub algorithm_config: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_setting() {
        assert_eq!(SensorProvider::from_setting(1), SensorProvider::Ssc);
        assert_eq!(SensorProvider::from_setting(4), SensorProvider::Ssc);
        assert_eq!(SensorProvider::from_setting(2), SensorProvider::Native);
        assert_eq!(SensorProvider::from_setting(0), SensorProvider::Native);
    }
}
