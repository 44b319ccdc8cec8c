//! Aiding data deletion flags

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Categories of assistance data to delete from the engine
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AidingData: u32 {
        const EPHEMERIS = 0x0001;
        const ALMANAC = 0x0002;
        const POSITION = 0x0004;
        const TIME = 0x0008;
        const IONO = 0x0010;
        const UTC = 0x0020;
        const HEALTH = 0x0040;
        const SVDIR = 0x0080;
        const SVSTEER = 0x0100;
        const SADATA = 0x0200;
        const RTI = 0x0400;
        const CELLDB_INFO = 0x8000;
        const ALL = 0xFFFF;
    }
}

impl AidingData {
    pub fn is_delete_all(&self) -> bool {
        *self == AidingData::ALL
    }
}
