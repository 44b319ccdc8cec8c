//! Raw GNSS measurement models
//!
//! Two shapes are produced from the same engine indication: the complete
//! [`SvMeasurementSet`] and the GPS-only [`GnssData`] consumed by the
//! measurement API.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{ApTimestamp, Constellation};

/// Maximum number of per-satellite records in a raw measurement set
pub const SV_MEAS_LIST_MAX: usize = 16;

/// Maximum number of measurements in a [`GnssData`] batch
pub const GNSS_MAX_MEASUREMENT: usize = 64;

bitflags! {
    /// Engine measurement status bits of a satellite record
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MeasurementStatus: u64 {
        /// Sub-millisecond time is valid
        const SM_VALID = 0x0000_0001;
        /// Sub-bit time is known
        const SB_VALID = 0x0000_0002;
        /// Satellite time (millisecond) is known
        const MS_VALID = 0x0000_0004;
        /// Bit edge confirmed from signal
        const BE_CONFIRM = 0x0000_0008;
        const VELOCITY_VALID = 0x0000_0010;
        /// Velocity comes from fine speed
        const VELOCITY_FINE = 0x0000_0020;
        const FROM_RNG_DIFF = 0x0000_0200;
        const FROM_VE_DIFF = 0x0000_0400;
        const DONT_USE = 0x8000_0000;
    }
}

impl MeasurementStatus {
    /// Bits that take part in measurement-state derivation
    pub const VALID_MEAS: MeasurementStatus = MeasurementStatus::SM_VALID
        .union(MeasurementStatus::SB_VALID)
        .union(MeasurementStatus::MS_VALID)
        .union(MeasurementStatus::BE_CONFIRM)
        .union(MeasurementStatus::VELOCITY_VALID)
        .union(MeasurementStatus::VELOCITY_FINE);
}

/// Search state of a satellite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvSearchStatus {
    #[default]
    Idle,
    Search,
    Track,
}

/// Receiver clock frequency estimate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClockFrequency {
    /// Clock drift in m/s
    pub drift: f32,
    pub drift_unc: f32,
    pub source: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeapSecond {
    pub seconds: u8,
}

/// Time offset between two constellations
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InterSystemBias {
    pub valid_mask: u32,
    pub time_bias: f32,
    pub time_bias_unc: f32,
}

/// The six pairwise inter-constellation biases
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InterSystemBiases {
    pub gps_glo: Option<InterSystemBias>,
    pub gps_bds: Option<InterSystemBias>,
    pub gps_gal: Option<InterSystemBias>,
    pub bds_glo: Option<InterSystemBias>,
    pub gal_glo: Option<InterSystemBias>,
    pub gal_bds: Option<InterSystemBias>,
}

/// System time of the constellation the measurements belong to
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemTime {
    pub week: u16,
    pub msec: u32,
    pub clk_time_bias: f32,
    pub clk_time_unc_ms: f32,
}

/// GLONASS system time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GloTime {
    pub four_year: u8,
    pub days: u16,
    pub msec: u32,
    pub clk_time_bias: f32,
    pub clk_time_unc_ms: f32,
}

/// Extended system time (frame counter and RTC)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemTimeExt {
    pub ref_f_count: u32,
    pub system_rtc_ms: u64,
    pub source_of_time: u8,
}

/// Satellite time and Doppler of one measurement
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SvTimeSpeed {
    pub sv_ms: u32,
    pub sv_sub_ms: f32,
    pub sv_time_unc_ms: f32,
    pub doppler_shift: f32,
    pub doppler_shift_unc: f32,
}

/// Elevation and azimuth of a measured satellite
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SvDirection {
    pub elevation: f32,
    pub azimuth: f32,
}

/// One per-satellite measurement record
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SvMeasurement {
    pub svid: u16,
    pub glo_frequency: u8,
    pub sv_status: SvSearchStatus,
    pub health_status: Option<u8>,
    pub sv_info_mask: u8,
    pub measurement_status: MeasurementStatus,
    /// Carrier to noise density in 0.1 dB-Hz
    pub c_n0: u16,
    pub glo_rf_loss: u16,
    pub loss_of_lock: Option<bool>,
    pub meas_latency: i32,
    pub sv_time_speed: SvTimeSpeed,
    pub multipath_estimate: Option<f32>,
    pub fine_speed: Option<f32>,
    pub fine_speed_unc: Option<f32>,
    pub carrier_phase: Option<f64>,
    pub direction: Option<SvDirection>,
    pub cycle_slip_count: Option<u8>,
}

/// Sequence-numbered batch of raw measurements for one constellation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SvMeasurementSet {
    pub seq_num: u8,
    pub max_message_num: u8,
    pub constellation: Constellation,
    pub clock_frequency: Option<ClockFrequency>,
    pub leap_second: Option<LeapSecond>,
    pub inter_system_bias: InterSystemBiases,
    pub system_time: Option<SystemTime>,
    pub glo_time: Option<GloTime>,
    pub system_time_ext: Option<SystemTimeExt>,
    pub measurements: Vec<SvMeasurement>,
    pub ap_timestamp: Option<ApTimestamp>,
}

bitflags! {
    /// Tracking state of a [`GnssMeasurement`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MeasurementState: u32 {
        const CODE_LOCK = 1 << 0;
        const BIT_SYNC = 1 << 1;
        const SUBFRAME_SYNC = 1 << 2;
        const TOW_DECODED = 1 << 3;
    }
}

/// Measurement of one satellite for the measurement API
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GnssMeasurement {
    pub svid: u16,
    pub constellation: Constellation,
    pub time_offset_ns: f64,
    pub state: MeasurementState,
    pub received_sv_time_ns: i64,
    pub received_sv_time_uncertainty_ns: i64,
    pub c_n0_dbhz: f64,
    pub pseudorange_rate_mps: f64,
    pub pseudorange_rate_uncertainty_mps: f64,
}

/// Receiver clock derived from the engine frame counter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GnssClock {
    pub time_ns: i64,
    pub hw_clock_discontinuity_count: u32,
    pub leap_second: Option<i16>,
    pub time_uncertainty_ns: Option<f64>,
    pub full_bias_ns: Option<i64>,
    pub bias_ns: Option<f64>,
    pub bias_uncertainty_ns: Option<f64>,
    pub drift_nsps: Option<f64>,
    pub drift_uncertainty_nsps: Option<f64>,
}

/// GPS measurements and clock for the measurement API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GnssData {
    pub measurements: Vec<GnssMeasurement>,
    pub clock: GnssClock,
}
