//! Event mask translation
//!
//! Maps application event categories onto engine subscription bits and
//! removes the bits that only make sense while a fix session is running.

use loc_core::AppEventMask;

use crate::wire::WireEventMask;

/// Fixed application-to-engine mapping. One category may set several bits.
const TRANSLATION: &[(AppEventMask, WireEventMask)] = &[
    (AppEventMask::POSITION_REPORT, WireEventMask::POSITION_REPORT),
    (AppEventMask::SATELLITE_REPORT, WireEventMask::GNSS_SV_INFO),
    (AppEventMask::NMEA_1HZ_REPORT, WireEventMask::NMEA),
    (AppEventMask::NMEA_POSITION_REPORT, WireEventMask::NMEA),
    (AppEventMask::NI_NOTIFY_VERIFY_REQUEST, WireEventMask::NI_NOTIFY_VERIFY_REQ),
    (
        AppEventMask::ASSISTANCE_DATA_REQUEST,
        WireEventMask::INJECT_PREDICTED_ORBITS_REQ
            .union(WireEventMask::INJECT_TIME_REQ)
            .union(WireEventMask::INJECT_POSITION_REQ),
    ),
    (AppEventMask::STATUS_REPORT, WireEventMask::ENGINE_STATE),
    (
        AppEventMask::LOCATION_SERVER_REQUEST,
        WireEventMask::LOCATION_SERVER_CONNECTION_REQ,
    ),
    (AppEventMask::REQUEST_WIFI, WireEventMask::WIFI_REQ),
    (
        AppEventMask::SENSOR_STATUS,
        WireEventMask::SENSOR_STREAMING_READY_STATUS,
    ),
    (AppEventMask::REQUEST_TIME_SYNC, WireEventMask::TIME_SYNC_REQ),
    (AppEventMask::REPORT_SPI, WireEventMask::SET_SPI_STREAMING_REPORT),
    (AppEventMask::REPORT_NI_GEOFENCE, WireEventMask::NI_GEOFENCE_NOTIFICATION),
    (AppEventMask::GEOFENCE_GEN_ALERT, WireEventMask::GEOFENCE_GEN_ALERT),
    (
        AppEventMask::REPORT_GEOFENCE_BREACH,
        WireEventMask::GEOFENCE_BREACH_NOTIFICATION,
    ),
    (
        AppEventMask::BATCHED_GEOFENCE_BREACH_REPORT,
        WireEventMask::GEOFENCE_BATCH_BREACH_NOTIFICATION,
    ),
    (AppEventMask::PEDOMETER_CTRL, WireEventMask::PEDOMETER_CONTROL),
    (
        AppEventMask::REPORT_GEOFENCE_DWELL,
        WireEventMask::GEOFENCE_BATCH_DWELL_NOTIFICATION,
    ),
    (AppEventMask::MOTION_CTRL, WireEventMask::MOTION_DATA_CONTROL),
    (AppEventMask::REQUEST_WIFI_AP_DATA, WireEventMask::INJECT_WIFI_AP_DATA_REQ),
    (AppEventMask::BATCH_FULL, WireEventMask::BATCH_FULL_NOTIFICATION),
    (
        AppEventMask::BATCHED_POSITION_REPORT,
        WireEventMask::LIVE_BATCHED_POSITION_REPORT,
    ),
    (
        AppEventMask::GNSS_MEASUREMENT_REPORT,
        WireEventMask::GNSS_MEASUREMENT_REPORT,
    ),
    (
        AppEventMask::GNSS_SV_POLYNOMIAL_REPORT,
        WireEventMask::GNSS_SV_POLYNOMIAL_REPORT,
    ),
    (AppEventMask::GDT_UPLOAD_BEGIN_REQ, WireEventMask::GDT_UPLOAD_BEGIN_REQ),
    (AppEventMask::GDT_UPLOAD_END_REQ, WireEventMask::GDT_UPLOAD_END_REQ),
    (AppEventMask::GNSS_MEASUREMENT, WireEventMask::GNSS_MEASUREMENT_REPORT),
    (AppEventMask::REQUEST_TIMEZONE, WireEventMask::GET_TIME_ZONE_REQ),
];

/// Bits that are only subscribed while a fix session is active
pub const SESSION_ONLY_BITS: WireEventMask = WireEventMask::POSITION_REPORT
    .union(WireEventMask::GNSS_SV_INFO)
    .union(WireEventMask::NMEA)
    .union(WireEventMask::ENGINE_STATE)
    .union(WireEventMask::GNSS_MEASUREMENT_REPORT);

/// Translate an application mask into engine subscription bits
pub fn translate(app_mask: AppEventMask) -> WireEventMask {
    TRANSLATION
        .iter()
        .filter(|(app, _)| app_mask.contains(*app))
        .fold(WireEventMask::empty(), |wire, (_, bits)| wire | *bits)
}

/// Clear the bits nobody consumes outside a session
pub fn suppress_session_only_bits(mask: WireEventMask) -> WireEventMask {
    mask.difference(SESSION_ONLY_BITS)
}

/// Mask to register given the session state
pub fn effective_mask(mask: WireEventMask, in_session: bool) -> WireEventMask {
    if in_session {
        mask
    } else {
        suppress_session_only_bits(mask)
    }
}

/// Whether the mask asks for SV measurement or polynomial reports
pub fn wants_measurements(mask: WireEventMask) -> bool {
    mask.intersects(
        WireEventMask::GNSS_MEASUREMENT_REPORT | WireEventMask::GNSS_SV_POLYNOMIAL_REPORT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_assistance_request_fans_out() {
        let wire = translate(AppEventMask::ASSISTANCE_DATA_REQUEST);
        assert_eq!(
            wire,
            WireEventMask::INJECT_PREDICTED_ORBITS_REQ
                | WireEventMask::INJECT_TIME_REQ
                | WireEventMask::INJECT_POSITION_REQ
        );
    }

    #[test]
    fn test_both_nmea_categories_share_a_bit() {
        assert_eq!(translate(AppEventMask::NMEA_1HZ_REPORT), WireEventMask::NMEA);
        assert_eq!(
            translate(AppEventMask::NMEA_1HZ_REPORT | AppEventMask::NMEA_POSITION_REPORT),
            WireEventMask::NMEA
        );
    }

    #[test]
    fn test_every_category_is_mapped() {
        for (name, flag) in AppEventMask::all().iter_names() {
            assert!(!translate(flag).is_empty(), "{} has no wire bits", name);
        }
    }

    #[test]
    fn test_suppression_clears_session_bits_only() {
        let wire = translate(AppEventMask::all());
        let suppressed = suppress_session_only_bits(wire);
        assert!(!suppressed.intersects(SESSION_ONLY_BITS));
        assert!(suppressed.contains(WireEventMask::NI_NOTIFY_VERIFY_REQ));
        assert!(suppressed.contains(WireEventMask::GNSS_SV_POLYNOMIAL_REPORT));
    }

    #[rstest]
    #[case(AppEventMask::empty())]
    #[case(AppEventMask::POSITION_REPORT)]
    #[case(AppEventMask::POSITION_REPORT | AppEventMask::SATELLITE_REPORT | AppEventMask::STATUS_REPORT)]
    #[case(AppEventMask::ASSISTANCE_DATA_REQUEST | AppEventMask::NMEA_1HZ_REPORT)]
    #[case(AppEventMask::GNSS_MEASUREMENT | AppEventMask::GNSS_SV_POLYNOMIAL_REPORT)]
    #[case(AppEventMask::all())]
    fn test_suppression_is_idempotent(#[case] app: AppEventMask) {
        let once = suppress_session_only_bits(translate(app));
        let twice = suppress_session_only_bits(once);
        assert_eq!(once, twice);
        assert_eq!(suppress_session_only_bits(translate(app)), once);
    }

    #[test]
    fn test_effective_mask() {
        let wire = translate(AppEventMask::POSITION_REPORT | AppEventMask::NI_NOTIFY_VERIFY_REQUEST);
        assert_eq!(effective_mask(wire, true), wire);
        assert_eq!(
            effective_mask(wire, false),
            WireEventMask::NI_NOTIFY_VERIFY_REQ
        );
    }
}
