//! Pulse controller
//!
//! A five-phase opacity/scale loop:
//!
//! | phase        | opacity     | scale       |
//! |--------------|-------------|-------------|
//! | `FadeIn`     | max → min   | min         |
//! | `ScaleUp`    | min         | min → max   |
//! | `FadeOut`    | min → max   | max         |
//! | `ScaleDown`  | max         | max → min   |
//! | `Hold`       | max         | min         |
//!
//! Adjacent phases meet at the same values, so the loop is continuous
//! everywhere, including across the hold → fade-in wrap. The loop never
//! finishes on its own; [`PulseController::stop`] cancels it and leaves the
//! last applied style in place.

use crate::animation::{Animation, AnimationKind, AnimationStatus, TimingWindow};
use crate::config::{AnimationConfig, PulseConfig};
use crate::error::{AnimationError, Result};
use crate::scheduler::{AnimationId, SchedulerHandle};
use crate::style::{
    StyleDescription, StyleLayer, StylePriority, StyleSink, StyleSlot, TargetId, VisualTarget,
    WeakTarget,
};
use crate::values::Range;
use std::time::Duration;

/// Slot every pulse instance writes to
pub const PULSE_SLOT: StyleSlot = StyleSlot::new(AnimationKind::Pulse, StyleLayer::OpacityScale);

/// One step of the pulse loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PulsePhase {
    FadeIn,
    ScaleUp,
    FadeOut,
    ScaleDown,
    Hold,
}

impl PulsePhase {
    /// The phase after this one, wrapping from `Hold` back to `FadeIn`
    pub fn next(self) -> Self {
        match self {
            PulsePhase::FadeIn => PulsePhase::ScaleUp,
            PulsePhase::ScaleUp => PulsePhase::FadeOut,
            PulsePhase::FadeOut => PulsePhase::ScaleDown,
            PulsePhase::ScaleDown => PulsePhase::Hold,
            PulsePhase::Hold => PulsePhase::FadeIn,
        }
    }

    /// Position in the loop, 0 through 4
    pub fn index(self) -> usize {
        match self {
            PulsePhase::FadeIn => 0,
            PulsePhase::ScaleUp => 1,
            PulsePhase::FadeOut => 2,
            PulsePhase::ScaleDown => 3,
            PulsePhase::Hold => 4,
        }
    }

    /// Length of this phase under `config`
    pub fn duration_ms(self, config: &PulseConfig) -> u64 {
        match self {
            PulsePhase::Hold => config.hold_ms,
            _ => config.phase_ms,
        }
    }
}

/// Opacity and scale ranges a pulse moves between
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseShape {
    /// Opacity going from visible to faded
    pub fade: Range<f64>,
    /// Scale going from rest to enlarged
    pub grow: Range<f64>,
}

impl PulseShape {
    pub fn from_config(config: &PulseConfig) -> Self {
        Self {
            fade: Range::new(config.max_opacity, config.min_opacity),
            grow: Range::new(config.min_scale, config.max_scale),
        }
    }

    /// `(opacity, scale)` at `progress` through `phase`
    pub fn sample(&self, phase: PulsePhase, progress: f64) -> (f64, f64) {
        match phase {
            PulsePhase::FadeIn => (self.fade.at(progress), self.grow.from),
            PulsePhase::ScaleUp => (self.fade.to, self.grow.at(progress)),
            PulsePhase::FadeOut => (self.fade.reversed().at(progress), self.grow.to),
            PulsePhase::ScaleDown => (self.fade.from, self.grow.reversed().at(progress)),
            PulsePhase::Hold => (self.fade.from, self.grow.from),
        }
    }
}

impl Default for PulseShape {
    fn default() -> Self {
        Self::from_config(&PulseConfig::default())
    }
}

/// A running pulse loop
pub struct PulseAnimation {
    target: WeakTarget,
    phase: PulsePhase,
    window: TimingWindow,
    shape: PulseShape,
    timings: PulseConfig,
    priority: StylePriority,
}

impl PulseAnimation {
    /// Move to the next phase, starting its window at `now_ms`
    fn advance(&mut self, now_ms: u64) {
        self.phase = self.phase.next();
        self.window
            .restart_with(now_ms, self.phase.duration_ms(&self.timings));
        tracing::trace!("Pulse entering phase {:?}", self.phase);
    }
}

impl Animation for PulseAnimation {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Pulse
    }

    fn target_id(&self) -> TargetId {
        self.target.id()
    }

    fn update(&mut self, now_ms: u64, sink: &dyn StyleSink) -> Result<AnimationStatus> {
        let target = self.target.resolve()?;

        // At most one phase per tick, even after a long stall
        let mut progress = self.window.progress(now_ms);
        if progress >= 1.0 {
            self.advance(now_ms);
            progress = 0.0;
        }

        let (opacity, scale) = self.shape.sample(self.phase, progress);
        sink.apply_style(
            &target,
            PULSE_SLOT,
            &StyleDescription::new()
                .with_opacity(opacity)
                .with_scale(scale),
            self.priority,
        );
        Ok(AnimationStatus::Running)
    }
}

/// Starts and stops pulse loops
#[derive(Clone)]
pub struct PulseController {
    handle: SchedulerHandle,
    timings: PulseConfig,
    priority: StylePriority,
}

impl PulseController {
    pub fn new(handle: SchedulerHandle) -> Self {
        Self::with_config(handle, &AnimationConfig::default())
    }

    pub fn with_config(handle: SchedulerHandle, config: &AnimationConfig) -> Self {
        Self {
            handle,
            timings: config.pulse.clone(),
            priority: config.style.animation_priority(),
        }
    }

    /// Start the pulse loop on `target`, replacing any pulse already there
    pub fn start(&self, target: &VisualTarget) -> Result<AnimationId> {
        let now = self.handle.now_ms()?;
        let window = TimingWindow::new(
            AnimationKind::Pulse,
            "phase duration",
            now,
            Duration::from_millis(self.timings.phase_ms),
        )?;
        if self.timings.hold_ms == 0 {
            return Err(AnimationError::InvalidDuration {
                kind: AnimationKind::Pulse,
                what: "hold duration",
            });
        }

        self.handle.detach(target.id(), AnimationKind::Pulse);
        let animation = PulseAnimation {
            target: target.downgrade(),
            phase: PulsePhase::FadeIn,
            window,
            shape: PulseShape::from_config(&self.timings),
            timings: self.timings.clone(),
            priority: self.priority,
        };
        let id = self.handle.attach(Box::new(animation))?;
        tracing::info!("Looping pulse started on {}", target.label());
        Ok(id)
    }

    /// Cancel the pulse on `target`, freezing its last applied style
    ///
    /// Returns false if no pulse was running.
    pub fn stop(&self, target: &VisualTarget) -> bool {
        let stopped = self.handle.detach(target.id(), AnimationKind::Pulse);
        if stopped {
            tracing::info!("Pulse stopped on {}", target.label());
        }
        stopped
    }

    pub fn is_active(&self, target: &VisualTarget) -> bool {
        self.handle.is_active(target.id(), AnimationKind::Pulse)
    }
}

/// Start an animation by property name
///
/// Only `"opacity"` is animatable this way; it starts the pulse loop with the
/// timings and ranges from `config`. Any other name is logged and rejected
/// without touching the target.
pub fn animate_property(
    handle: &SchedulerHandle,
    config: &AnimationConfig,
    target: &VisualTarget,
    property: &str,
) -> Result<AnimationId> {
    match property {
        "opacity" => PulseController::with_config(handle.clone(), config).start(target),
        other => {
            tracing::warn!("Property '{}' is not supported for animation", other);
            Err(AnimationError::UnsupportedProperty(other.to_string()))
        }
    }
}
