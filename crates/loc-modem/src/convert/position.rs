//! Position indication conversion

use loc_core::{
    ApTimestamp, Location, LocationExtended, LocationSource, PositionReport, Reliability,
    SessionStatus, SvUsedInFix, TechMask, UncertaintyEllipse, ZppFix,
};
use tracing::{debug, trace};

use crate::wire::{PositionReportInd, PositionSessionStatus, ZppPosition};

/// Confidence the upward interface expects accuracies to be expressed in
const TARGET_CONFIDENCE: u8 = 68;

/// Engine satellite id ranges per constellation, inclusive
const GPS_SV_IDS: (u16, u16) = (1, 32);
const GLO_SV_IDS: (u16, u16) = (65, 96);
const BDS_SV_IDS: (u16, u16) = (201, 237);
const GAL_SV_IDS: (u16, u16) = (301, 336);

/// Rescale a horizontal accuracy given at `confidence` percent to 68%.
///
/// Accuracies already at or above 68% are returned unchanged.
pub fn scale_accuracy_to_68(confidence: u8, accuracy: f32) -> f32 {
    if confidence >= TARGET_CONFIDENCE {
        return accuracy;
    }
    let scale = match confidence {
        0..=39 => 1.517,
        40..=50 => 1.287,
        _ => 1.072,
    };
    accuracy * scale
}

/// Horizontal accuracy from the circular uncertainty, else from the ellipse
fn horizontal_accuracy(ind: &PositionReportInd) -> Option<f32> {
    let raw = ind.hor_unc_circular.or_else(|| {
        match (ind.hor_unc_ellipse_semi_minor, ind.hor_unc_ellipse_semi_major) {
            (Some(minor), Some(major)) => Some((minor * minor + major * major).sqrt()),
            _ => None,
        }
    })?;

    Some(match ind.hor_confidence {
        Some(confidence) => scale_accuracy_to_68(confidence, raw),
        None => raw,
    })
}

fn set_bit(mask: &mut u64, id: u16, range: (u16, u16)) -> bool {
    let (min, max) = range;
    if (min..=max).contains(&id) {
        *mask |= 1u64 << (id - min);
        true
    } else {
        false
    }
}

/// Per-constellation bit-sets of the satellites used in a fix
pub fn sv_used_masks(ids: &[u16]) -> SvUsedInFix {
    let mut used = SvUsedInFix::default();
    for &id in ids {
        let matched = set_bit(&mut used.gps, id, GPS_SV_IDS)
            || set_bit(&mut used.glo, id, GLO_SV_IDS)
            || set_bit(&mut used.bds, id, BDS_SV_IDS)
            || set_bit(&mut used.gal, id, GAL_SV_IDS);
        if !matched {
            trace!(id, "Used satellite outside known ranges");
        }
    }
    used
}

fn extended_fields(ind: &PositionReportInd, ap_timestamp: ApTimestamp) -> LocationExtended {
    LocationExtended {
        magnetic_deviation: ind.magnetic_deviation,
        dop: ind.dop,
        altitude_msl: ind.altitude_wrt_mean_sea_level,
        vert_unc: ind.vert_unc,
        speed_unc: ind.speed_unc,
        bearing_unc: ind.heading_unc,
        horizontal_reliability: ind.hor_reliability,
        vertical_reliability: ind.vert_reliability,
        uncertainty_ellipse: UncertaintyEllipse {
            semi_major: ind.hor_unc_ellipse_semi_major,
            semi_minor: ind.hor_unc_ellipse_semi_minor,
            azimuth: ind.hor_unc_ellipse_orient_azimuth,
        },
        sv_used: ind
            .gnss_sv_used_list
            .as_deref()
            .filter(|ids| !ids.is_empty())
            .map(sv_used_masks),
        ap_timestamp: Some(ap_timestamp),
    }
}

/// Convert a position indication into exactly one report.
///
/// A fix at exactly (0, 0) with unset horizontal reliability is a
/// placeholder from the engine and is reported as a failure. Failed sessions
/// and fixes without coordinates are failure reports with no location.
pub fn convert_position(ind: &PositionReportInd, ap_timestamp: ApTimestamp) -> PositionReport {
    let in_progress = match ind.session_status {
        PositionSessionStatus::Success => false,
        PositionSessionStatus::InProgress => true,
        other => {
            debug!(status = ?other, "Position session failed");
            return PositionReport::failure();
        }
    };

    let (Some(latitude), Some(longitude)) = (ind.latitude, ind.longitude) else {
        debug!("Position indication without coordinates");
        return PositionReport::failure();
    };

    let location = Location {
        latitude,
        longitude,
        altitude: ind.altitude_wrt_ellipsoid.map(f64::from),
        speed: ind.speed_horizontal,
        bearing: ind.heading,
        accuracy: horizontal_accuracy(ind),
        timestamp_ms: ind.timestamp_utc,
        source: LocationSource::Gnss,
    };

    let placeholder = latitude == 0.0
        && longitude == 0.0
        && ind.hor_reliability == Some(Reliability::NotSet);

    let status = if placeholder {
        debug!("Discarding placeholder fix at (0, 0)");
        SessionStatus::Failure
    } else if in_progress {
        SessionStatus::Intermediate
    } else {
        SessionStatus::Success
    };

    PositionReport {
        location: Some(location),
        extended: extended_fields(ind, ap_timestamp),
        status,
        tech_mask: ind
            .technology_mask
            .map(TechMask::from_bits_truncate)
            .unwrap_or_default(),
    }
}

/// Convert a zero-power position response.
///
/// Returns `None` when the response carries no coordinates.
pub fn convert_zpp(pos: &ZppPosition) -> Option<ZppFix> {
    let (latitude, longitude) = (pos.latitude?, pos.longitude?);

    let accuracy = pos.hor_unc_circular.map(|unc| match pos.hor_circular_confidence {
        Some(confidence) => scale_accuracy_to_68(confidence, unc),
        None => unc,
    });

    let tech_mask = pos
        .technology_mask
        .map(TechMask::from_bits_truncate)
        .unwrap_or_default();

    let source = if tech_mask.contains(TechMask::SATELLITE) {
        LocationSource::Gnss
    } else {
        LocationSource::Network
    };

    Some(ZppFix {
        location: Location {
            latitude,
            longitude,
            altitude: pos.altitude_wrt_ellipsoid.map(f64::from),
            speed: pos.horizontal_speed,
            bearing: pos.heading,
            accuracy,
            timestamp_ms: pos.timestamp_utc,
            source,
        },
        tech_mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ts() -> ApTimestamp {
        ApTimestamp {
            since_boot: Duration::from_secs(42),
            uncertainty_ms: 0.0,
        }
    }

    fn fix(lat: f64, lon: f64) -> PositionReportInd {
        PositionReportInd {
            latitude: Some(lat),
            longitude: Some(lon),
            hor_unc_circular: Some(10.0),
            technology_mask: Some(0x01),
            ..Default::default()
        }
    }

    #[test]
    fn test_confidence_scaling() {
        assert!((scale_accuracy_to_68(50, 10.0) - 12.87).abs() < 1e-4);
        assert!((scale_accuracy_to_68(39, 10.0) - 15.17).abs() < 1e-4);
        assert!((scale_accuracy_to_68(63, 10.0) - 10.72).abs() < 1e-4);
        assert_eq!(scale_accuracy_to_68(68, 10.0), 10.0);
        assert_eq!(scale_accuracy_to_68(95, 10.0), 10.0);
    }

    #[test]
    fn test_success_fix() {
        let mut ind = fix(37.0, -122.0);
        ind.hor_confidence = Some(50);
        ind.gnss_sv_used_list = Some(vec![1, 3, 65, 201, 301]);

        let report = convert_position(&ind, ts());
        assert_eq!(report.status, SessionStatus::Success);
        assert_eq!(report.tech_mask, TechMask::SATELLITE);

        let location = report.location.unwrap();
        assert!((location.accuracy.unwrap() - 12.87).abs() < 1e-4);
        assert_eq!(location.source, LocationSource::Gnss);

        let used = report.extended.sv_used.unwrap();
        assert_eq!(used.gps, 0b101);
        assert_eq!(used.glo, 1);
        assert_eq!(used.bds, 1);
        assert_eq!(used.gal, 1);
        assert_eq!(report.extended.ap_timestamp, Some(ts()));
    }

    #[test]
    fn test_in_progress_is_intermediate() {
        let mut ind = fix(37.0, -122.0);
        ind.session_status = PositionSessionStatus::InProgress;
        let report = convert_position(&ind, ts());
        assert_eq!(report.status, SessionStatus::Intermediate);
        assert!(report.location.is_some());
    }

    #[test]
    fn test_placeholder_fix_is_failure() {
        let mut ind = fix(0.0, 0.0);
        ind.hor_reliability = Some(Reliability::NotSet);
        let report = convert_position(&ind, ts());
        assert!(report.is_failure());
        assert!(report.location.is_some());

        // A genuine fix at (0, 0) with known reliability is kept
        ind.hor_reliability = Some(Reliability::High);
        assert_eq!(convert_position(&ind, ts()).status, SessionStatus::Success);
    }

    #[test]
    fn test_failed_session_has_no_location() {
        let mut ind = fix(37.0, -122.0);
        ind.session_status = PositionSessionStatus::Timeout;
        let report = convert_position(&ind, ts());
        assert!(report.is_failure());
        assert!(report.location.is_none());
    }

    #[test]
    fn test_missing_coordinates_is_failure() {
        let ind = PositionReportInd::default();
        assert_eq!(convert_position(&ind, ts()), PositionReport::failure());
    }

    #[test]
    fn test_ellipse_accuracy_fallback() {
        let mut ind = fix(1.0, 1.0);
        ind.hor_unc_circular = None;
        ind.hor_unc_ellipse_semi_minor = Some(3.0);
        ind.hor_unc_ellipse_semi_major = Some(4.0);
        let location = convert_position(&ind, ts()).location.unwrap();
        assert_eq!(location.accuracy, Some(5.0));
    }

    #[test]
    fn test_empty_used_list_leaves_masks_unset() {
        let mut ind = fix(1.0, 1.0);
        ind.gnss_sv_used_list = Some(Vec::new());
        assert_eq!(convert_position(&ind, ts()).extended.sv_used, None);
    }

    #[test]
    fn test_sv_used_ignores_out_of_range() {
        let used = sv_used_masks(&[0, 33, 64, 97, 200, 238, 300, 337]);
        assert_eq!(used, SvUsedInFix::default());

        let used = sv_used_masks(&[32, 96, 237, 336]);
        assert_eq!(used.gps, 1 << 31);
        assert_eq!(used.glo, 1 << 31);
        assert_eq!(used.bds, 1 << 36);
        assert_eq!(used.gal, 1 << 35);
    }

    #[test]
    fn test_zpp_conversion() {
        let pos = ZppPosition {
            latitude: Some(10.0),
            longitude: Some(20.0),
            hor_unc_circular: Some(100.0),
            hor_circular_confidence: Some(39),
            technology_mask: Some(0x02),
            ..Default::default()
        };
        let fix = convert_zpp(&pos).unwrap();
        assert_eq!(fix.tech_mask, TechMask::CELLID);
        assert_eq!(fix.location.source, LocationSource::Network);
        assert!((fix.location.accuracy.unwrap() - 151.7).abs() < 1e-3);

        assert!(convert_zpp(&ZppPosition::default()).is_none());
    }
}
