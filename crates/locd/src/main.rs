//! locd - Location daemon
//!
//! Drives a [`LocAdapter`] against the simulated engine and logs every
//! upward report until interrupted.
//!
//! Usage:
//!   locd [OPTIONS] [config.toml]
//!
//! Options:
//!   --gps-conf <path>  Platform configuration (KEY=VALUE) to read the
//!                      timestamp uncertainty from

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use loc_core::{
    AppEventMask, ChannelReporter, FixCriteria, LocationEvent, Reliability, SvSearchStatus,
};
use loc_modem::wire::{
    EngineEvent, EngineStateInd, NmeaInd, PositionReportInd, SvInfoInd, SvInfoMask, SvSystem,
    WireSvInfo,
};
use loc_modem::{AdapterConfig, LocAdapter, MockEngine, StdClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command-line arguments
struct Args {
    config_path: Option<String>,
    gps_conf: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: None,
        gps_conf: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--gps-conf" | "-g" => {
                if i + 1 < args.len() {
                    result.gps_conf = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    tracing::error!("Missing argument for --gps-conf");
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"locd - Location daemon

Usage: locd [OPTIONS] [config.toml]

Options:
  -g, --gps-conf <path>  Read AP_TIMESTAMP_UNCERTAINTY from a KEY=VALUE file
  -h, --help             Print this help message

Examples:
  # Run with defaults
  locd

  # Run with adapter config and platform config
  locd --gps-conf /etc/gps.conf locd.toml
"#
    );
}

fn load_config(args: &Args) -> anyhow::Result<AdapterConfig> {
    let mut config = match &args.config_path {
        Some(path) => AdapterConfig::load(path)
            .with_context(|| format!("Failed to load adapter config from {}", path))?,
        None => AdapterConfig::default(),
    };

    if let Some(path) = &args.gps_conf {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read platform config {}", path))?;
        config.apply_gps_conf(&text);
    }
    Ok(config)
}

/// Feed the mock engine with a steady stream of fix-session indications
fn simulate_engine(engine: Arc<MockEngine>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        engine.inject_event(EngineEvent::EngineState(EngineStateInd::On));

        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let mut step = 0u32;
        loop {
            ticker.tick().await;
            step += 1;
            let drift = f64::from(step) * 1e-5;

            engine.inject_event(EngineEvent::SvInfo(SvInfoInd {
                sv_list: (1..=6)
                    .map(|id| WireSvInfo {
                        system: Some(SvSystem::Gps),
                        gnss_sv_id: Some(id),
                        sv_status: Some(SvSearchStatus::Track),
                        sv_info_mask: Some(SvInfoMask::HAS_EPHEMERIS),
                        elevation: Some(15.0 + f32::from(id) * 10.0),
                        azimuth: Some(f32::from(id) * 60.0),
                        snr: Some(30.0 + f32::from(id)),
                        ..Default::default()
                    })
                    .collect(),
            }));

            engine.inject_event(EngineEvent::PositionReport(Box::new(PositionReportInd {
                latitude: Some(48.1374 + drift),
                longitude: Some(11.5755 - drift),
                hor_unc_circular: Some(8.0),
                hor_confidence: Some(68),
                hor_reliability: Some(Reliability::High),
                altitude_wrt_ellipsoid: Some(560.0),
                speed_horizontal: Some(1.2),
                heading: Some(270.0),
                technology_mask: Some(0x0001),
                gnss_sv_used_list: Some((1..=6).collect()),
                ..Default::default()
            })));

            engine.inject_event(EngineEvent::Nmea(NmeaInd {
                nmea: format!("$GPGGA,{:06},4808.244,N,01134.530,E,1,06,0.9,560.0,M,,,,*47", step),
            }));
        }
    })
}

fn log_report(event: LocationEvent) {
    match event {
        LocationEvent::Position(report) => match report.location {
            Some(loc) => tracing::info!(
                lat = loc.latitude,
                lon = loc.longitude,
                accuracy = ?loc.accuracy,
                "Position"
            ),
            None => tracing::warn!(status = ?report.status, "Position fix failed"),
        },
        LocationEvent::Sv(status) => tracing::debug!(count = status.svs.len(), "Satellites"),
        LocationEvent::Nmea(sentence) => tracing::trace!(%sentence, "NMEA"),
        LocationEvent::Status(status) => tracing::info!(?status, "Engine status"),
        other => tracing::info!(event = ?other, "Report"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locd=info,loc_modem=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting locd (location daemon)");

    let args = parse_args();
    let config = load_config(&args)?;
    tracing::info!(
        sync_timeout_ms = config.sync_timeout_ms,
        xtra_part_len = config.xtra_part_len,
        "Adapter configuration loaded"
    );

    let engine = Arc::new(MockEngine::new());
    let (reporter, mut reports) = ChannelReporter::new();
    let adapter = LocAdapter::new(
        engine.clone(),
        Arc::new(reporter),
        Arc::new(StdClock::new()),
        config,
    );

    let report_task = tokio::spawn(async move {
        while let Some(event) = reports.recv().await {
            log_report(event);
        }
    });

    adapter
        .open(
            AppEventMask::POSITION_REPORT
                | AppEventMask::SATELLITE_REPORT
                | AppEventMask::NMEA_1HZ_REPORT
                | AppEventMask::STATUS_REPORT
                | AppEventMask::NI_NOTIFY_VERIFY_REQUEST
                | AppEventMask::ASSISTANCE_DATA_REQUEST
                | AppEventMask::LOCATION_SERVER_REQUEST,
        )
        .await
        .context("Failed to open location adapter")?;

    if let Err(e) = adapter.request_xtra_server().await {
        tracing::warn!(error = %e, "XTRA server query failed");
    }
    adapter
        .start_fix(FixCriteria::default())
        .await
        .context("Failed to start fix session")?;

    let simulator = simulate_engine(engine);
    tracing::info!("Fix session running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    simulator.abort();
    if let Err(e) = adapter.stop_fix().await {
        tracing::warn!(error = %e, "Stop failed");
    }
    adapter.close().await?;
    drop(adapter);
    report_task.abort();

    tracing::info!("locd stopped");
    Ok(())
}
