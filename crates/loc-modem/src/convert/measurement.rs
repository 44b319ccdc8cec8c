//! Raw measurement conversion
//!
//! One engine measurement indication feeds two consumers: the complete
//! [`SvMeasurementSet`] and, for GPS only, the [`GnssData`] of the
//! measurement API.

use loc_core::{
    ApTimestamp, Constellation, GnssData, GnssMeasurement, InterSystemBiases, LeapSecond,
    MeasurementState, MeasurementStatus, SvMeasurement, SvMeasurementSet,
    GNSS_MAX_MEASUREMENT, SV_MEAS_LIST_MAX,
};
use tracing::{debug, trace};

use super::clock::ClockTracker;
use super::sv::constellation_of;
use crate::wire::{SvMeasurementInd, SvSystem, WireSvMeasurement};

/// GPS data bit period in milliseconds
const BIT_PERIOD_MS: f64 = 20.0;

fn to_sv_measurement(m: &WireSvMeasurement) -> SvMeasurement {
    SvMeasurement {
        svid: m.gnss_sv_id,
        glo_frequency: m.glo_frequency,
        sv_status: m.sv_status,
        health_status: m.health_status,
        sv_info_mask: m.sv_info_mask,
        measurement_status: m.measurement_status,
        c_n0: m.cno,
        glo_rf_loss: m.glo_rf_loss,
        loss_of_lock: m.loss_of_lock,
        meas_latency: m.meas_latency,
        sv_time_speed: m.sv_time_speed,
        multipath_estimate: m.multipath_estimate,
        fine_speed: m.fine_speed,
        fine_speed_unc: m.fine_speed_unc,
        carrier_phase: m.carrier_phase,
        direction: m.direction,
        cycle_slip_count: m.cycle_slip_count,
    }
}

/// Build the complete measurement set of an indication.
///
/// Records with a zero id or an empty measurement status are dropped and
/// the remaining ones are kept contiguous, up to [`SV_MEAS_LIST_MAX`].
pub fn convert_measurement_set(ind: &SvMeasurementInd, ap_timestamp: ApTimestamp) -> SvMeasurementSet {
    let measurements: Vec<SvMeasurement> = ind
        .sv_measurements
        .iter()
        .filter(|m| m.gnss_sv_id != 0 && !m.measurement_status.is_empty())
        .take(SV_MEAS_LIST_MAX)
        .map(to_sv_measurement)
        .collect();

    if measurements.len() != ind.sv_measurements.len() {
        debug!(
            received = ind.sv_measurements.len(),
            kept = measurements.len(),
            "Dropped unusable measurement records"
        );
    }

    SvMeasurementSet {
        seq_num: ind.seq_num,
        max_message_num: ind.max_message_num,
        constellation: constellation_of(ind.system),
        clock_frequency: ind.rcv_clock_frequency,
        leap_second: ind
            .leap_second
            .filter(|leap| leap.leap_sec_unc == 0)
            .map(|leap| LeapSecond {
                seconds: leap.leap_sec,
            }),
        inter_system_bias: InterSystemBiases {
            gps_glo: ind.gps_glo_inter_system_bias,
            gps_bds: ind.gps_bds_inter_system_bias,
            gps_gal: ind.gps_gal_inter_system_bias,
            bds_glo: ind.bds_glo_inter_system_bias,
            gal_glo: ind.gal_glo_inter_system_bias,
            gal_bds: ind.gal_bds_inter_system_bias,
        },
        system_time: ind.system_time,
        glo_time: ind.glo_time,
        system_time_ext: ind.system_time_ext,
        measurements,
        ap_timestamp: Some(ap_timestamp),
    }
}

/// Convert one record for the measurement API
pub fn convert_gnss_measurement(m: &WireSvMeasurement) -> GnssMeasurement {
    let status = m.measurement_status;
    let valid = status & m.valid_meas_status_mask;
    let sv_ms = f64::from(m.sv_time_speed.sv_ms);
    let sv_sub_ms = f64::from(m.sv_time_speed.sv_sub_ms);

    let (state, received_sv_time_ns) = if valid.contains(MeasurementStatus::MS_VALID) {
        (
            MeasurementState::SUBFRAME_SYNC
                | MeasurementState::TOW_DECODED
                | MeasurementState::BIT_SYNC
                | MeasurementState::CODE_LOCK,
            ((sv_ms + sv_sub_ms) * 1e6) as i64,
        )
    } else if valid.contains(MeasurementStatus::BE_CONFIRM | MeasurementStatus::SB_VALID) {
        (
            MeasurementState::BIT_SYNC | MeasurementState::CODE_LOCK,
            (((sv_ms + sv_sub_ms) % BIT_PERIOD_MS) * 1e6) as i64,
        )
    } else if valid.contains(MeasurementStatus::SM_VALID) {
        (MeasurementState::CODE_LOCK, (sv_sub_ms * 1e6) as i64)
    } else {
        (MeasurementState::empty(), 0)
    };

    let received_sv_time_uncertainty_ns = if state.is_empty() {
        0
    } else {
        (f64::from(m.sv_time_speed.sv_time_unc_ms) * 1e6) as i64
    };

    let (rate, rate_unc) = if status.contains(MeasurementStatus::VELOCITY_FINE) {
        (m.fine_speed.unwrap_or(0.0), m.fine_speed_unc.unwrap_or(0.0))
    } else {
        (
            m.sv_time_speed.doppler_shift,
            m.sv_time_speed.doppler_shift_unc,
        )
    };

    GnssMeasurement {
        svid: m.gnss_sv_id,
        constellation: Constellation::Gps,
        time_offset_ns: 0.0,
        state,
        received_sv_time_ns,
        received_sv_time_uncertainty_ns,
        c_n0_dbhz: f64::from(m.cno) / 10.0,
        pseudorange_rate_mps: f64::from(rate),
        pseudorange_rate_uncertainty_mps: f64::from(rate_unc),
    }
}

/// Build the measurement API batch of an indication.
///
/// Only GPS indications with at least one usable record produce data.
pub fn convert_gnss_data(ind: &SvMeasurementInd, tracker: &mut ClockTracker) -> Option<GnssData> {
    if ind.system != SvSystem::Gps {
        trace!(system = ?ind.system, "No measurement API data for this constellation");
        return None;
    }

    let measurements: Vec<GnssMeasurement> = ind
        .sv_measurements
        .iter()
        .filter(|m| m.gnss_sv_id != 0)
        .take(GNSS_MAX_MEASUREMENT)
        .map(convert_gnss_measurement)
        .collect();

    if measurements.is_empty() {
        return None;
    }

    Some(GnssData {
        measurements,
        clock: tracker.convert(ind),
    })
}
