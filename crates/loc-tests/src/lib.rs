//! End-to-end tests for the location adapter
//!
//! The tests in `tests/` drive a full [`LocAdapter`] (dispatcher, control
//! worker, session manager and service layer) against the [`MockEngine`]
//! and observe the upward reports through a [`ChannelReporter`].
//!
//! ```bash
//! cargo test -p loc-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use loc_core::{AppEventMask, ChannelReporter, GnssStatus, LocResult, LocationEvent};
use loc_modem::{AdapterConfig, LocAdapter, ManualClock, MockEngine};
use tokio::sync::mpsc;

/// Sync timeout used by the harness, short enough to exercise timeouts
pub const TEST_SYNC_TIMEOUT_MS: u64 = 150;

/// Mask most scenarios open with
pub fn default_mask() -> AppEventMask {
    AppEventMask::POSITION_REPORT
        | AppEventMask::SATELLITE_REPORT
        | AppEventMask::NMEA_1HZ_REPORT
        | AppEventMask::STATUS_REPORT
        | AppEventMask::NI_NOTIFY_VERIFY_REQUEST
        | AppEventMask::ASSISTANCE_DATA_REQUEST
}

/// Adapter over a mock engine with its report channel
pub struct AdapterHarness {
    pub adapter: LocAdapter,
    pub engine: Arc<MockEngine>,
    pub clock: ManualClock,
    events: mpsc::UnboundedReceiver<LocationEvent>,
}

impl AdapterHarness {
    pub fn new() -> Self {
        Self::with_config(AdapterConfig {
            sync_timeout_ms: TEST_SYNC_TIMEOUT_MS,
            xtra_part_len: 16,
            ..AdapterConfig::default()
        })
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        let engine = Arc::new(MockEngine::new());
        let clock = ManualClock::new(Duration::from_secs(60), 1_700_000_000_000);
        let (reporter, events) = ChannelReporter::new();
        let adapter = LocAdapter::new(
            engine.clone(),
            Arc::new(reporter),
            Arc::new(clock.clone()),
            config,
        );
        Self {
            adapter,
            engine,
            clock,
            events,
        }
    }

    /// Open with [`default_mask`]
    pub async fn opened() -> LocResult<Self> {
        let harness = Self::new();
        harness.adapter.open(default_mask()).await?;
        Ok(harness)
    }

    /// Next upward event, or `None` if nothing arrives within a second
    pub async fn next_event(&mut self) -> Option<LocationEvent> {
        tokio::time::timeout(Duration::from_secs(1), self.events.recv())
            .await
            .ok()
            .flatten()
    }

    /// Let the dispatcher and control worker process queued indications
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    /// Everything reported so far
    pub fn drain(&mut self) -> Vec<LocationEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// Status reports among everything reported so far
    pub fn drain_statuses(&mut self) -> Vec<GnssStatus> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                LocationEvent::Status(status) => Some(status),
                _ => None,
            })
            .collect()
    }
}

impl Default for AdapterHarness {
    fn default() -> Self {
        Self::new()
    }
}
