//! Position report models

use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::SessionStatus;

bitflags! {
    /// Technologies that contributed to a position
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TechMask: u32 {
        const SATELLITE = 0x0001;
        const CELLID = 0x0002;
        const WIFI = 0x0004;
        const SENSORS = 0x0008;
        const REFERENCE_LOCATION = 0x0010;
        const INJECTED_COARSE_POSITION = 0x0020;
        const AFLT = 0x0040;
        const HYBRID = 0x0080;
    }
}

/// Where a location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    #[default]
    Gnss,
    Network,
}

/// Normalized location
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude above the WGS-84 ellipsoid in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Horizontal speed in m/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Heading in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f32>,
    /// Horizontal accuracy in meters at 68% confidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f32>,
    /// UTC timestamp in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    pub source: LocationSource,
}

/// Reliability of a position component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    NotSet,
    VeryLow,
    Low,
    Medium,
    High,
}

/// Dilution of precision
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dop {
    pub pdop: f32,
    pub hdop: f32,
    pub vdop: f32,
}

/// Horizontal uncertainty ellipse
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UncertaintyEllipse {
    pub semi_major: Option<f32>,
    pub semi_minor: Option<f32>,
    pub azimuth: Option<f32>,
}

/// Satellites used in a fix, one bit-set per constellation.
///
/// Bit `n` is set when the satellite with constellation-local index `n`
/// contributed to the fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SvUsedInFix {
    pub gps: u64,
    pub glo: u64,
    pub bds: u64,
    pub gal: u64,
}

/// Application processor boot-clock timestamp of a report
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ApTimestamp {
    pub since_boot: Duration,
    pub uncertainty_ms: f32,
}

/// Extended position data not present in [`Location`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationExtended {
    pub magnetic_deviation: Option<f32>,
    pub dop: Option<Dop>,
    /// Altitude above mean sea level in meters
    pub altitude_msl: Option<f32>,
    pub vert_unc: Option<f32>,
    pub speed_unc: Option<f32>,
    pub bearing_unc: Option<f32>,
    pub horizontal_reliability: Option<Reliability>,
    pub vertical_reliability: Option<Reliability>,
    pub uncertainty_ellipse: UncertaintyEllipse,
    pub sv_used: Option<SvUsedInFix>,
    pub ap_timestamp: Option<ApTimestamp>,
}

/// One position report produced from an engine position indication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    /// `None` when the engine reported a failed session
    pub location: Option<Location>,
    pub extended: LocationExtended,
    pub status: SessionStatus,
    pub tech_mask: TechMask,
}

impl PositionReport {
    pub fn failure() -> Self {
        Self {
            location: None,
            extended: LocationExtended::default(),
            status: SessionStatus::Failure,
            tech_mask: TechMask::empty(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == SessionStatus::Failure
    }
}

/// Zero-power position obtained without a full session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZppFix {
    pub location: Location,
    pub tech_mask: TechMask,
}
