//! Satellite snapshot models

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Maximum number of satellites carried in one snapshot
pub const GNSS_MAX_SVS: usize = 64;

/// GNSS constellation of a satellite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constellation {
    #[default]
    Unknown,
    Gps,
    Sbas,
    Glonass,
    Qzss,
    Beidou,
    Galileo,
}

bitflags! {
    /// Per-satellite state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SvFlags: u8 {
        const HAS_EPHEMERIS = 0x01;
        const HAS_ALMANAC = 0x02;
        const USED_IN_FIX = 0x04;
    }
}

/// One satellite of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvInfo {
    /// Constellation-local satellite id
    pub svid: u16,
    pub constellation: Constellation,
    /// Carrier to noise density in dB-Hz
    pub c_n0_dbhz: f32,
    /// Elevation in degrees
    pub elevation: f32,
    /// Azimuth in degrees
    pub azimuth: f32,
    pub flags: SvFlags,
}

/// Bounded snapshot of visible satellites
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SvStatus {
    pub svs: Vec<SvInfo>,
}

impl SvStatus {
    pub fn used_in_fix(&self) -> impl Iterator<Item = &SvInfo> {
        self.svs
            .iter()
            .filter(|sv| sv.flags.contains(SvFlags::USED_IN_FIX))
    }
}
