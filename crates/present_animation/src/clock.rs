//! Clock sources
//!
//! Every animation measures elapsed time as `now - start_time` against a
//! [`Clock`]. Readings are whole milliseconds since an arbitrary epoch and
//! never decrease.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic millisecond clock
pub trait Clock: Send + Sync {
    /// Milliseconds since this clock's epoch
    fn now_ms(&self) -> u64;
}

/// Clock backed by [`Instant`], unaffected by wall-clock adjustments
///
/// The epoch is the moment the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to
///
/// Clones share the same reading, so a test can keep one copy and hand the
/// other to a scheduler.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock that starts at `now_ms`
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    /// Move the clock forward by `delta_ms`
    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::AcqRel);
    }

    /// Jump to `now_ms`. Earlier readings are ignored to keep the clock monotonic.
    pub fn set(&self, now_ms: u64) {
        self.now.fetch_max(now_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}
