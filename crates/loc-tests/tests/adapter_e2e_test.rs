//! End-to-end tests for the location adapter
//!
//! Every scenario runs the full adapter against the mock engine:
//! 1. Open the adapter with a subscription mask
//! 2. Drive control operations and inject engine indications
//! 3. Check the requests the engine saw and the reports delivered upward
//!
//! Run with: cargo test -p loc-tests --test adapter_e2e_test

use std::time::Duration;

use bytes::Bytes;
use loc_core::{
    AidingData, AppEventMask, FixCriteria, GnssStatus, GpsLockMask, LocError, LocationEvent,
    MeasurementStatus, Reliability, SessionStatus, SvFlags, SvSearchStatus, TechMask,
};
use loc_modem::mask::{suppress_session_only_bits, translate};
use loc_modem::wire::{
    EngineEvent, EngineLock, EngineResponse, EngineStateInd, IndicationStatus, MessageId,
    PositionReportInd, ResponsePayload, SvInfoInd, SvInfoMask, SvMeasurementInd, SvSystem,
    WireSvInfo, WireSvMeasurement,
};
use loc_modem::{ClientErrorKind, MockReply, SessionState};
use loc_tests::{default_mask, AdapterHarness};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn position(lat: f64, lon: f64) -> PositionReportInd {
    PositionReportInd {
        latitude: Some(lat),
        longitude: Some(lon),
        hor_unc_circular: Some(10.0),
        hor_confidence: Some(68),
        hor_reliability: Some(Reliability::High),
        ..Default::default()
    }
}

fn tracked_gps(id: u16, snr: f32) -> WireSvInfo {
    WireSvInfo {
        system: Some(SvSystem::Gps),
        gnss_sv_id: Some(id),
        sv_status: Some(SvSearchStatus::Track),
        sv_info_mask: Some(SvInfoMask::HAS_EPHEMERIS),
        elevation: Some(45.0),
        azimuth: Some(90.0),
        snr: Some(snr),
        ..Default::default()
    }
}

async fn next_position(h: &mut AdapterHarness) -> loc_core::PositionReport {
    loop {
        match h.next_event().await {
            Some(LocationEvent::Position(report)) => return report,
            Some(_) => continue,
            None => panic!("No position report delivered"),
        }
    }
}

// =============================================================================
// Event mask
// =============================================================================

#[test]
fn test_suppression_is_idempotent_for_every_category() {
    let all: Vec<AppEventMask> = AppEventMask::all().iter().collect();
    let mut masks = all.clone();
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            masks.push(*a | *b);
        }
    }
    masks.push(AppEventMask::all());
    masks.push(AppEventMask::empty());

    for mask in masks {
        let once = suppress_session_only_bits(translate(mask));
        assert_eq!(suppress_session_only_bits(once), once, "mask {:?}", mask);
        assert_eq!(
            suppress_session_only_bits(translate(mask)),
            once,
            "re-translating {:?}",
            mask
        );
    }
}

#[tokio::test]
async fn test_start_then_stop_leaves_suppressed_mask() {
    let h = AdapterHarness::opened().await.unwrap();
    h.adapter.start_fix(FixCriteria::default()).await.unwrap();
    assert_eq!(h.engine.last_registered_mask(), Some(translate(default_mask())));

    h.adapter.stop_fix().await.unwrap();
    assert_eq!(
        h.engine.last_registered_mask(),
        Some(suppress_session_only_bits(translate(default_mask())))
    );
    assert_eq!(h.adapter.state().await, SessionState::Idle);
}

#[tokio::test]
async fn test_widening_mask_does_not_reprobe() {
    let h = AdapterHarness::opened().await.unwrap();
    h.adapter.open(AppEventMask::LOCATION_SERVER_REQUEST).await.unwrap();
    h.adapter.open(AppEventMask::LOCATION_SERVER_REQUEST).await.unwrap();

    assert_eq!(h.engine.open_count(), 1);
    assert_eq!(h.engine.count_sent(MessageId::GetSupportedFeature), 1);
    // open mask plus one update
    assert_eq!(h.engine.registered_masks().len(), 2);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_placeholder_fix_is_failure() {
    let mut h = AdapterHarness::opened().await.unwrap();
    let mut ind = position(0.0, 0.0);
    ind.hor_reliability = Some(Reliability::NotSet);
    h.engine
        .inject_event(EngineEvent::PositionReport(Box::new(ind)));

    let report = next_position(&mut h).await;
    assert_eq!(report.status, SessionStatus::Failure);
}

#[rstest]
#[case(50, 12.87)]
#[case(68, 10.0)]
#[case(39, 15.17)]
#[tokio::test]
async fn test_accuracy_scaled_to_68(#[case] confidence: u8, #[case] expected: f32) {
    let mut h = AdapterHarness::opened().await.unwrap();
    let mut ind = position(48.0, 11.0);
    ind.hor_confidence = Some(confidence);
    h.engine
        .inject_event(EngineEvent::PositionReport(Box::new(ind)));

    let report = next_position(&mut h).await;
    assert_eq!(report.status, SessionStatus::Success);
    let accuracy = report.location.unwrap().accuracy.unwrap();
    assert!((accuracy - expected).abs() < 1e-3, "got {}", accuracy);
}

#[tokio::test]
async fn test_used_in_fix_needs_signal() {
    let mut h = AdapterHarness::opened().await.unwrap();
    h.engine.inject_event(EngineEvent::SvInfo(SvInfoInd {
        sv_list: vec![tracked_gps(3, 0.0), tracked_gps(4, 27.0)],
    }));

    match h.next_event().await {
        Some(LocationEvent::Sv(status)) => {
            assert_eq!(status.svs.len(), 2);
            assert!(!status.svs[0].flags.contains(SvFlags::USED_IN_FIX));
            assert!(status.svs[1].flags.contains(SvFlags::USED_IN_FIX));
        }
        other => panic!("Expected satellite report, got {:?}", other),
    }
}

#[tokio::test]
async fn test_measurement_feeds_both_sinks() {
    let mut h = AdapterHarness::opened().await.unwrap();
    let mut ind = SvMeasurementInd::new(SvSystem::Gps);
    ind.sv_measurements = vec![WireSvMeasurement {
        gnss_sv_id: 9,
        measurement_status: MeasurementStatus::SM_VALID,
        valid_meas_status_mask: MeasurementStatus::VALID_MEAS,
        cno: 400,
        ..Default::default()
    }];
    h.engine
        .inject_event(EngineEvent::GnssMeasurement(Box::new(ind)));

    match h.next_event().await {
        Some(LocationEvent::SvMeasurement(set)) => {
            assert_eq!(set.measurements.len(), 1);
            assert_eq!(set.ap_timestamp.unwrap().since_boot, Duration::from_secs(60));
        }
        other => panic!("Expected SV measurement set, got {:?}", other),
    }
    match h.next_event().await {
        Some(LocationEvent::GnssMeasurement(data)) => {
            assert_eq!(data.measurements.len(), 1);
            assert_eq!(data.measurements[0].svid, 9);
        }
        other => panic!("Expected GNSS measurement data, got {:?}", other),
    }
}

// =============================================================================
// Engine state
// =============================================================================

#[tokio::test]
#[serial_test::serial]
async fn test_engine_on_while_active_reports_begin() {
    let mut h = AdapterHarness::opened().await.unwrap();
    h.adapter.start_fix(FixCriteria::default()).await.unwrap();

    h.engine
        .inject_event(EngineEvent::EngineState(EngineStateInd::On));
    h.settle().await;
    assert_eq!(
        h.drain_statuses(),
        vec![GnssStatus::EngineOn, GnssStatus::SessionBegin]
    );
}

#[tokio::test]
#[serial_test::serial]
async fn test_engine_on_while_idle_reports_nothing() {
    let mut h = AdapterHarness::opened().await.unwrap();
    h.engine
        .inject_event(EngineEvent::EngineState(EngineStateInd::On));
    h.settle().await;
    assert_eq!(h.drain_statuses(), vec![]);
}

#[tokio::test]
#[serial_test::serial]
async fn test_engine_off_after_stop_suppresses_mask() {
    let mut h = AdapterHarness::opened().await.unwrap();
    h.adapter.start_fix(FixCriteria::default()).await.unwrap();
    h.engine
        .inject_event(EngineEvent::EngineState(EngineStateInd::On));
    h.settle().await;

    h.adapter.stop_fix().await.unwrap();
    assert_eq!(h.engine.last_registered_mask(), Some(translate(default_mask())));

    h.engine
        .inject_event(EngineEvent::EngineState(EngineStateInd::Off));
    h.settle().await;
    assert_eq!(
        h.engine.last_registered_mask(),
        Some(suppress_session_only_bits(translate(default_mask())))
    );
    assert_eq!(
        h.drain_statuses(),
        vec![
            GnssStatus::EngineOn,
            GnssStatus::SessionBegin,
            GnssStatus::SessionEnd,
            GnssStatus::EngineOff,
        ]
    );
}

// =============================================================================
// Synchronous requests
// =============================================================================

#[tokio::test]
#[serial_test::serial]
async fn test_late_response_is_discarded() {
    let h = AdapterHarness::opened().await.unwrap();
    h.engine.reply_once(
        MessageId::GetEngineLock,
        MockReply::Delayed(
            Duration::from_millis(200),
            EngineResponse::success(MessageId::GetEngineLock)
                .with_payload(ResponsePayload::EngineLock(Some(EngineLock::All))),
        ),
    );
    assert_eq!(h.adapter.get_gps_lock().await, Err(LocError::Timeout));

    // stale lock response lands while this request waits
    h.engine.reply_once(
        MessageId::SetNmeaTypes,
        MockReply::Delayed(
            Duration::from_millis(120),
            EngineResponse::success(MessageId::SetNmeaTypes),
        ),
    );
    h.adapter
        .set_nmea_types(loc_core::NmeaTypes::GGA)
        .await
        .unwrap();

    assert_eq!(h.adapter.get_gps_lock().await, Ok(GpsLockMask::empty()));
}

#[tokio::test]
async fn test_xtra_chunking_and_partial_failure() {
    let h = AdapterHarness::opened().await.unwrap();
    let injected = h
        .adapter
        .set_xtra_data(Bytes::from(vec![7u8; 33]))
        .await
        .unwrap();
    assert_eq!(injected, 33);
    assert_eq!(h.engine.count_sent(MessageId::InjectPredictedOrbitsData), 3);

    h.engine.clear_sent();
    h.engine.reply_once(
        MessageId::InjectPredictedOrbitsData,
        MockReply::Respond(
            EngineResponse::success(MessageId::InjectPredictedOrbitsData)
                .with_payload(ResponsePayload::PredictedOrbitsPart { part_num: 1 }),
        ),
    );
    h.engine.reply_once(
        MessageId::InjectPredictedOrbitsData,
        MockReply::Respond(EngineResponse::with_status(
            MessageId::InjectPredictedOrbitsData,
            IndicationStatus::GeneralFailure,
        )),
    );
    let err = h
        .adapter
        .set_xtra_data(Bytes::from(vec![7u8; 33]))
        .await
        .unwrap_err();
    assert_eq!(err.injected, 16);
    assert_eq!((err.part, err.total_parts), (2, 3));
    assert_eq!(h.engine.count_sent(MessageId::InjectPredictedOrbitsData), 2);
}

#[tokio::test]
#[serial_test::serial]
async fn test_operation_mode_timeout_still_starts() {
    let h = AdapterHarness::opened().await.unwrap();
    h.engine
        .reply_once(MessageId::SetOperationMode, MockReply::NoResponse);
    h.adapter.start_fix(FixCriteria::default()).await.unwrap();
    assert_eq!(h.engine.count_sent(MessageId::Start), 1);
    assert_eq!(h.adapter.state().await, SessionState::Active);
}

// =============================================================================
// Fallback and recovery
// =============================================================================

#[tokio::test]
async fn test_delete_falls_back_to_legacy() {
    let h = AdapterHarness::opened().await.unwrap();
    h.engine.set_reply(
        MessageId::DeleteGnssServiceData,
        MockReply::Respond(EngineResponse::with_status(
            MessageId::DeleteGnssServiceData,
            IndicationStatus::Unsupported,
        )),
    );

    h.adapter.delete_aiding_data(AidingData::ALL).await.unwrap();
    h.adapter
        .delete_aiding_data(AidingData::EPHEMERIS)
        .await
        .unwrap();
    assert_eq!(h.engine.count_sent(MessageId::DeleteGnssServiceData), 1);
    assert_eq!(h.engine.count_sent(MessageId::DeleteAssistData), 2);
}

#[tokio::test]
#[serial_test::serial]
async fn test_service_loss_reopens_and_restarts() {
    let h = AdapterHarness::opened().await.unwrap();
    h.adapter.start_fix(FixCriteria::default()).await.unwrap();

    h.engine.inject_error(ClientErrorKind::ServiceUnavailable);
    h.settle().await;

    assert_eq!(h.engine.close_count(), 1);
    assert!(h.engine.is_open());
    assert_eq!(h.engine.open_count(), 2);
    assert_eq!(h.engine.count_sent(MessageId::Start), 2);
    assert_eq!(h.adapter.state().await, SessionState::Active);
    assert_eq!(h.engine.last_registered_mask(), Some(translate(default_mask())));
}

#[tokio::test]
#[serial_test::serial]
async fn test_service_loss_while_idle_reopens_only() {
    let h = AdapterHarness::opened().await.unwrap();
    h.engine.inject_error(ClientErrorKind::ServiceUnavailable);
    h.settle().await;

    assert_eq!(h.engine.close_count(), 1);
    assert!(h.engine.is_open());
    assert_eq!(h.engine.open_count(), 2);
    assert_eq!(h.engine.count_sent(MessageId::Start), 0);
    assert_eq!(h.adapter.state().await, SessionState::Idle);
    assert_eq!(
        h.engine.last_registered_mask(),
        Some(suppress_session_only_bits(translate(default_mask())))
    );
}

#[tokio::test]
#[serial_test::serial]
async fn test_legacy_delete_reset_by_recovery() {
    let h = AdapterHarness::opened().await.unwrap();
    h.engine.reply_once(
        MessageId::DeleteGnssServiceData,
        MockReply::Respond(EngineResponse::with_status(
            MessageId::DeleteGnssServiceData,
            IndicationStatus::Unsupported,
        )),
    );
    h.adapter.delete_aiding_data(AidingData::TIME).await.unwrap();

    h.engine.inject_error(ClientErrorKind::ServiceUnavailable);
    h.settle().await;

    h.adapter.delete_aiding_data(AidingData::TIME).await.unwrap();
    assert_eq!(h.engine.count_sent(MessageId::DeleteGnssServiceData), 2);
    assert_eq!(h.engine.count_sent(MessageId::DeleteAssistData), 1);
}

// =============================================================================
// Zero-power positions
// =============================================================================

#[tokio::test]
async fn test_wwan_zpp_falls_back_to_cell_position() {
    let h = AdapterHarness::opened().await.unwrap();
    h.engine.reply_once(
        MessageId::GetAvailableWwanPosition,
        MockReply::Respond(EngineResponse::with_status(
            MessageId::GetAvailableWwanPosition,
            IndicationStatus::GeneralFailure,
        )),
    );
    let fix = h.adapter.get_wwan_zpp_fix().await.unwrap();
    assert!(fix.tech_mask.contains(TechMask::CELLID));
    assert_eq!(fix.location.accuracy, Some(1500.0));
}

#[tokio::test]
async fn test_close_then_operations_fail() {
    let h = AdapterHarness::opened().await.unwrap();
    h.adapter.close().await.unwrap();
    h.adapter.close().await.unwrap();
    assert_eq!(h.adapter.state().await, SessionState::Closed);
    assert_eq!(
        h.adapter.start_fix(FixCriteria::default()).await,
        Err(LocError::InvalidHandle)
    );
}
