//! Animation instances
//!
//! An [`Animation`] is one running animation attached to one visual target.
//! The scheduler knows nothing about what an instance animates: it calls
//! [`Animation::update`] once per tick and removes the instance when it
//! reports [`AnimationStatus::Finished`] (or fails).

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};
use crate::style::{StyleSink, TargetId};

/// The kinds of animation a target can carry, at most one of each
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Rotation,
    Pulse,
    Camera,
}

impl AnimationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKind::Rotation => "rotation",
            AnimationKind::Pulse => "pulse",
            AnimationKind::Camera => "camera",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What an instance tells the scheduler after an update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    /// Keep ticking
    Running,
    /// Done; deregister and tear down
    Finished,
}

/// A running animation
pub trait Animation: Send {
    fn kind(&self) -> AnimationKind;

    /// The target this instance is registered under
    fn target_id(&self) -> TargetId;

    /// Advance to `now_ms` and push the resulting styles through `sink`
    ///
    /// Must not block. An `Err` is treated as terminal for this instance only.
    fn update(&mut self, now_ms: u64, sink: &dyn StyleSink) -> Result<AnimationStatus>;

    /// Release resources; called exactly once, after the instance has been
    /// removed from the scheduler
    fn teardown(&mut self) {}
}

/// A timing window: where it started and how long it lasts
///
/// Progress is always derived from `now - start`, never from tick counts, so
/// jittery ticks do not accumulate drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingWindow {
    start_ms: u64,
    duration_ms: u64,
}

impl TimingWindow {
    /// Create a window, rejecting zero-length and unrepresentable durations
    /// up front
    pub fn new(
        kind: AnimationKind,
        what: &'static str,
        start_ms: u64,
        duration: Duration,
    ) -> Result<Self> {
        let duration_ms = u64::try_from(duration.as_millis())
            .map_err(|_| AnimationError::InvalidDuration { kind, what })?;
        if duration_ms == 0 {
            return Err(AnimationError::InvalidDuration { kind, what });
        }
        Ok(Self {
            start_ms,
            duration_ms,
        })
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    /// Raw progress, `>= 0`, may exceed 1.0
    pub fn progress(&self, now_ms: u64) -> f64 {
        self.elapsed_ms(now_ms) as f64 / self.duration_ms as f64
    }

    /// Start a new window at `now_ms` with the same duration
    pub fn restart(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
    }

    /// Start a new window at `now_ms` with a different, non-zero duration
    pub(crate) fn restart_with(&mut self, now_ms: u64, duration_ms: u64) {
        debug_assert!(duration_ms > 0);
        self.start_ms = now_ms;
        self.duration_ms = duration_ms.max(1);
    }
}

/// Reject non-finite floats before they reach an update
pub(crate) fn ensure_finite(kind: AnimationKind, what: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnimationError::InvalidParameter { kind, what })
    }
}
