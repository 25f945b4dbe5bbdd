//! Clock Adapters

use crate::ports::outbound::Clock;
use parking_lot::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock in unix seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock for deterministic tests.
pub struct ManualClock {
    current_time: RwLock<u64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            current_time: RwLock::new(start),
        }
    }

    /// Set current time for testing.
    pub fn set_time(&self, time: u64) {
        *self.current_time.write() = time;
    }

    /// Advance time for testing.
    pub fn advance_time(&self, secs: u64) {
        *self.current_time.write() += secs;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        *self.current_time.read()
    }
}
