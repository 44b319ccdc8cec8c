//! Time sources used for report timestamps and time injection

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;

/// Boot-relative and wall-clock time
pub trait SystemClock: Send + Sync {
    /// Monotonic time since boot
    fn since_boot(&self) -> Duration;

    /// UTC wall-clock time in milliseconds since the Unix epoch
    fn utc_now_ms(&self) -> u64;
}

/// Clock backed by [`Instant`] and the system wall clock.
///
/// Boot time is approximated by the instant the clock was created.
#[derive(Debug, Clone)]
pub struct StdClock {
    boot: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock for StdClock {
    fn since_boot(&self) -> Duration {
        self.boot.elapsed()
    }

    fn utc_now_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Manually advanced clock for tests and simulations
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<(Duration, u64)>>,
}

impl ManualClock {
    pub fn new(since_boot: Duration, utc_ms: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new((since_boot, utc_ms))),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock();
        state.0 += by;
        state.1 += by.as_millis() as u64;
    }
}

impl SystemClock for ManualClock {
    fn since_boot(&self) -> Duration {
        self.state.lock().0
    }

    fn utc_now_ms(&self) -> u64 {
        self.state.lock().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_clock_is_monotonic() {
        let clock = StdClock::new();
        let a = clock.since_boot();
        let b = clock.since_boot();
        assert!(b >= a);
        assert!(clock.utc_now_ms() > 1_600_000_000_000);
    }

    #[test]
    fn test_manual_clock_advances_both() {
        let clock = ManualClock::new(Duration::from_secs(10), 1_000);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.since_boot(), Duration::from_millis(10_250));
        assert_eq!(clock.utc_now_ms(), 1_250);
    }
}
