//! Adapter configuration

use std::path::Path;
use std::time::Duration;

use loc_core::{AppEventMask, ConstellationSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Key of the AP timestamp uncertainty in the platform GPS configuration
const AP_TIMESTAMP_UNCERTAINTY_KEY: &str = "AP_TIMESTAMP_UNCERTAINTY";

fn default_sync_timeout_ms() -> u64 {
    1000
}

fn default_xtra_part_len() -> usize {
    1024
}

fn default_ap_timestamp_uncertainty_ms() -> f32 {
    0.0
}

fn default_excluded_events() -> AppEventMask {
    AppEventMask::empty()
}

fn default_measurement_constellations() -> ConstellationSet {
    ConstellationSet::default()
}

/// Tunables of a [`LocAdapter`](crate::LocAdapter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Bound for every synchronous request, in milliseconds
    #[serde(default = "default_sync_timeout_ms")]
    pub sync_timeout_ms: u64,

    /// Predicted-orbits chunk size in bytes
    #[serde(default = "default_xtra_part_len")]
    pub xtra_part_len: usize,

    #[serde(default = "default_ap_timestamp_uncertainty_ms")]
    pub ap_timestamp_uncertainty_ms: f32,

    /// Event categories never subscribed, whatever the caller asks for
    #[serde(default = "default_excluded_events")]
    pub excluded_events: AppEventMask,

    /// Constellations enabled for measurement and polynomial reporting
    #[serde(default = "default_measurement_constellations")]
    pub measurement_constellations: ConstellationSet,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            sync_timeout_ms: default_sync_timeout_ms(),
            xtra_part_len: default_xtra_part_len(),
            ap_timestamp_uncertainty_ms: default_ap_timestamp_uncertainty_ms(),
            excluded_events: default_excluded_events(),
            measurement_constellations: default_measurement_constellations(),
        }
    }
}

impl AdapterConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Loaded adapter config");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    /// Apply values from a `KEY=VALUE` platform GPS configuration text
    pub fn apply_gps_conf(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() != AP_TIMESTAMP_UNCERTAINTY_KEY {
                continue;
            }
            match value.trim().parse::<f32>() {
                Ok(v) => self.ap_timestamp_uncertainty_ms = v,
                Err(e) => warn!(value = value.trim(), error = %e, "Ignoring invalid timestamp uncertainty"),
            }
        }
    }
}
