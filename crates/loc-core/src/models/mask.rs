//! Application-facing event categories

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Logical event categories a client of the adapter can subscribe to.
    ///
    /// Each category maps onto one or more engine subscription bits; see the
    /// event mask translator in the modem crate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AppEventMask: u64 {
        const POSITION_REPORT = 1 << 0;
        const SATELLITE_REPORT = 1 << 1;
        const NMEA_1HZ_REPORT = 1 << 2;
        const NMEA_POSITION_REPORT = 1 << 3;
        const NI_NOTIFY_VERIFY_REQUEST = 1 << 4;
        const ASSISTANCE_DATA_REQUEST = 1 << 5;
        const LOCATION_SERVER_REQUEST = 1 << 6;
        const STATUS_REPORT = 1 << 7;
        const REQUEST_WIFI = 1 << 8;
        const SENSOR_STATUS = 1 << 9;
        const REQUEST_TIME_SYNC = 1 << 10;
        const REPORT_SPI = 1 << 11;
        const REPORT_NI_GEOFENCE = 1 << 12;
        const GEOFENCE_GEN_ALERT = 1 << 13;
        const REPORT_GEOFENCE_BREACH = 1 << 14;
        const PEDOMETER_CTRL = 1 << 15;
        const MOTION_CTRL = 1 << 16;
        const REQUEST_WIFI_AP_DATA = 1 << 17;
        const BATCH_FULL = 1 << 18;
        const BATCHED_POSITION_REPORT = 1 << 19;
        const BATCHED_GEOFENCE_BREACH_REPORT = 1 << 20;
        const GNSS_MEASUREMENT_REPORT = 1 << 21;
        const GNSS_SV_POLYNOMIAL_REPORT = 1 << 22;
        const GDT_UPLOAD_BEGIN_REQ = 1 << 23;
        const GDT_UPLOAD_END_REQ = 1 << 24;
        const GNSS_MEASUREMENT = 1 << 25;
        const REQUEST_TIMEZONE = 1 << 26;
        const REPORT_GEOFENCE_DWELL = 1 << 27;
    }
}

bitflags! {
    /// Constellations selectable for SV measurement and polynomial reporting
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ConstellationSet: u64 {
        const GPS = 1 << 0;
        const GLONASS = 1 << 1;
        const BDS = 1 << 2;
        const GALILEO = 1 << 3;
        const QZSS = 1 << 4;
    }
}

impl Default for ConstellationSet {
    fn default() -> Self {
        ConstellationSet::GPS | ConstellationSet::GLONASS
    }
}

bitflags! {
    /// GPS lock policy requested by the framework
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GpsLockMask: u32 {
        /// Mobile-originated sessions locked
        const MO = 0x1;
        /// Network-initiated sessions locked
        const NI = 0x2;
    }
}

bitflags! {
    /// NMEA sentence types the engine should emit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NmeaTypes: u32 {
        const GGA = 0x0001;
        const RMC = 0x0002;
        const GSV = 0x0004;
        const GSA = 0x0008;
        const VTG = 0x0010;
        const PQXFI = 0x0020;
        const PSTIS = 0x0040;
        const GLGSV = 0x0080;
        const GNGSA = 0x0100;
        const GNGNS = 0x0200;
        const GARMC = 0x0400;
        const GAGSV = 0x0800;
        const GAGSA = 0x1000;
        const GAVTG = 0x2000;
        const GAGGA = 0x4000;
    }
}
