//! Receiver clock derivation for the measurement API

use loc_core::GnssClock;
use tracing::trace;

use crate::wire::SvMeasurementInd;

/// Milliseconds in one GPS week
pub const WEEK_MSECS: u64 = 60 * 60 * 24 * 7 * 1000;

/// GPS week value meaning "unknown"
pub const C_GPS_WEEK_UNKNOWN: u16 = 65535;

/// Meters per second to nanoseconds per second
pub const MPS_TO_NSPS: f64 = 1.0 / 0.299_792_458;

/// Clock uncertainty above which the system time is not trusted, in ms
const MAX_CLOCK_UNC_MS: f32 = 16.0;

/// Frame-counter continuity state carried across measurement indications
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockTracker {
    old_ref_f_count: u32,
    old_disc_count: u32,
    local_disc_count: u32,
    measurements_started: bool,
}

impl ClockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a new measurement stream; the next clock counts
    /// as a discontinuity
    pub fn mark_measurements_started(&mut self) {
        self.measurements_started = true;
    }

    pub fn discontinuity_count(&self) -> u32 {
        self.local_disc_count
    }

    /// Derive the receiver clock of a measurement indication
    pub fn convert(&mut self, ind: &SvMeasurementInd) -> GnssClock {
        let mut clock = GnssClock::default();

        if let (Some(ext), Some(resets)) = (ind.system_time_ext, ind.num_clock_resets) {
            let new_ref = ext.ref_f_count;
            if self.measurements_started
                || resets != self.old_disc_count
                || new_ref <= self.old_ref_f_count
            {
                self.measurements_started = false;
                self.local_disc_count += 1;
                trace!(count = self.local_disc_count, "Clock discontinuity");
            }
            self.old_disc_count = resets;
            self.old_ref_f_count = new_ref;

            clock.time_ns = (i64::from(new_ref) as f64 * 1e6) as i64;
            clock.hw_clock_discontinuity_count = self.local_disc_count;
            clock.time_uncertainty_ns = Some(0.0);

            if let Some(sys) = ind.system_time {
                if sys.week != C_GPS_WEEK_UNKNOWN && sys.clk_time_unc_ms <= MAX_CLOCK_UNC_MS {
                    let gps_msec = f64::from(sys.week) * WEEK_MSECS as f64 + f64::from(sys.msec);
                    let bias_ns = (f64::from(sys.clk_time_bias) * 1e6) as i32;
                    let gps_time_ns = gps_msec * 1e6 - f64::from(bias_ns);
                    let diff = clock.time_ns as f64 - gps_time_ns;
                    let full_bias = diff as i64;

                    clock.full_bias_ns = Some(full_bias);
                    clock.bias_ns = Some(diff - full_bias as f64);
                    clock.bias_uncertainty_ns = Some(f64::from(sys.clk_time_unc_ms) * 1e6);
                }
            }
        }

        if let Some(freq) = ind.rcv_clock_frequency {
            clock.drift_nsps = Some(f64::from(freq.drift) * MPS_TO_NSPS);
            clock.drift_uncertainty_nsps = Some(f64::from(freq.drift_unc) * MPS_TO_NSPS);
        }

        clock
    }
}
