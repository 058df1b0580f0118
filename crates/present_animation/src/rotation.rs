//! Rotation controller
//!
//! Two flavours of rotation on a single target:
//!
//! - **Continuous**: a sine round trip over one cycle (0° → 360° → 0° around
//!   a 180° midpoint), looping until cancelled. Every second cycle boundary
//!   snaps the target back to 0° to keep the installed transform bounded.
//! - **Pushback**: a one-shot sweep with back-overshoot easing that lands
//!   exactly on the requested angle and then finishes.
//!
//! Both write to the rotation layer of the target's rotation slot.

use std::time::Duration;

use crate::animation::{ensure_finite, Animation, AnimationKind, AnimationStatus, TimingWindow};
use crate::config::AnimationConfig;
use crate::easing::{back_overshoot, sine_round_trip};
use crate::error::Result;
use crate::scheduler::{AnimationId, SchedulerHandle};
use crate::style::{
    StyleDescription, StyleLayer, StylePriority, StyleSink, StyleSlot, TargetId, VisualTarget,
    WeakTarget,
};

/// Slot every rotation instance writes to
pub const ROTATION_SLOT: StyleSlot = StyleSlot::new(AnimationKind::Rotation, StyleLayer::Rotation);

/// Degrees covered by one continuous cycle
const FULL_TURN: f64 = 360.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum RotationMode {
    /// Loops forever; `cycle_count` parity drives the periodic reset
    Continuous { cycle_count: u64 },
    /// One-shot; lands on `sweep_degrees`
    Pushback { sweep_degrees: f64 },
}

/// A running rotation
pub struct RotationAnimation {
    target: WeakTarget,
    window: TimingWindow,
    mode: RotationMode,
    current_angle: f64,
    priority: StylePriority,
}

impl RotationAnimation {
    fn new(
        target: &VisualTarget,
        window: TimingWindow,
        mode: RotationMode,
        priority: StylePriority,
    ) -> Self {
        Self {
            target: target.downgrade(),
            window,
            mode,
            current_angle: 0.0,
            priority,
        }
    }

    /// Angle installed by the most recent update
    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self.mode, RotationMode::Continuous { .. })
    }

    fn apply(&mut self, sink: &dyn StyleSink, target: &VisualTarget, angle: f64) {
        self.current_angle = angle;
        sink.apply_style(
            target,
            ROTATION_SLOT,
            &StyleDescription::rotation(angle),
            self.priority,
        );
    }
}

impl Animation for RotationAnimation {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Rotation
    }

    fn target_id(&self) -> TargetId {
        self.target.id()
    }

    fn update(&mut self, now_ms: u64, sink: &dyn StyleSink) -> Result<AnimationStatus> {
        let target = self.target.resolve()?;
        let mut progress = self.window.progress(now_ms);

        match self.mode {
            RotationMode::Continuous { cycle_count } => {
                if progress >= 1.0 {
                    let cycle_count = cycle_count + 1;
                    self.mode = RotationMode::Continuous { cycle_count };
                    self.window.restart(now_ms);
                    progress = 0.0;

                    if cycle_count % 2 == 0 {
                        tracing::debug!(
                            "Rotation on {} reset to 0deg after cycle {}",
                            target.label(),
                            cycle_count
                        );
                        self.apply(sink, &target, 0.0);
                        return Ok(AnimationStatus::Running);
                    }
                }
                self.apply(sink, &target, sine_round_trip(progress) * FULL_TURN);
                Ok(AnimationStatus::Running)
            }
            RotationMode::Pushback { sweep_degrees } => {
                if progress >= 1.0 {
                    self.apply(sink, &target, sweep_degrees);
                    tracing::info!("Pushback rotation on {} complete", target.label());
                    return Ok(AnimationStatus::Finished);
                }
                self.apply(sink, &target, back_overshoot(progress) * sweep_degrees);
                Ok(AnimationStatus::Running)
            }
        }
    }
}

/// Starts, replaces and resets rotations
#[derive(Clone)]
pub struct RotationController {
    handle: SchedulerHandle,
    priority: StylePriority,
}

impl RotationController {
    pub fn new(handle: SchedulerHandle) -> Self {
        Self::with_config(handle, &AnimationConfig::default())
    }

    pub fn with_config(handle: SchedulerHandle, config: &AnimationConfig) -> Self {
        Self {
            handle,
            priority: config.style.animation_priority(),
        }
    }

    /// Loop a sine round-trip rotation with the given full-cycle duration
    ///
    /// Replaces any rotation already on `target` and snaps it to 0° first.
    pub fn start_continuous(
        &self,
        target: &VisualTarget,
        full_cycle: Duration,
    ) -> Result<AnimationId> {
        let now = self.handle.now_ms()?;
        let window =
            TimingWindow::new(AnimationKind::Rotation, "full cycle duration", now, full_cycle)?;

        self.handle.detach(target.id(), AnimationKind::Rotation);
        self.handle.apply_style(
            target,
            ROTATION_SLOT,
            &StyleDescription::rotation(0.0),
            self.priority,
        )?;

        let animation = RotationAnimation::new(
            target,
            window,
            RotationMode::Continuous { cycle_count: 0 },
            self.priority,
        );
        let id = self.handle.attach(Box::new(animation))?;
        tracing::info!(
            "Continuous rotation started on {} ({}ms cycle)",
            target.label(),
            window.duration_ms()
        );
        Ok(id)
    }

    /// Sweep `total_rotation_degrees` once with a back-overshoot, then stop
    /// exactly on that angle
    pub fn start_pushback(
        &self,
        target: &VisualTarget,
        total_rotation_degrees: f64,
        duration: Duration,
    ) -> Result<AnimationId> {
        let sweep_degrees = ensure_finite(
            AnimationKind::Rotation,
            "total rotation degrees",
            total_rotation_degrees,
        )?;
        let now = self.handle.now_ms()?;
        let window = TimingWindow::new(AnimationKind::Rotation, "pushback duration", now, duration)?;

        self.handle.detach(target.id(), AnimationKind::Rotation);

        let animation = RotationAnimation::new(
            target,
            window,
            RotationMode::Pushback { sweep_degrees },
            self.priority,
        );
        let id = self.handle.attach(Box::new(animation))?;
        tracing::info!(
            "Pushback rotation started on {} ({}deg over {}ms)",
            target.label(),
            sweep_degrees,
            window.duration_ms()
        );
        Ok(id)
    }

    /// Cancel any rotation on `target` and put it back at 0° immediately
    pub fn reset(&self, target: &VisualTarget) -> Result<()> {
        self.handle.detach(target.id(), AnimationKind::Rotation);
        self.handle.apply_style(
            target,
            ROTATION_SLOT,
            &StyleDescription::rotation(0.0),
            self.priority,
        )?;
        tracing::info!("Rotation reset on {}", target.label());
        Ok(())
    }

    /// Whether a rotation is still running on `target`
    pub fn is_active(&self, target: &VisualTarget) -> bool {
        self.handle.is_active(target.id(), AnimationKind::Rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::AnimationError;
    use crate::scheduler::AnimationScheduler;
    use crate::style::StyleTable;
    use std::sync::Arc;

    const EPSILON: f64 = 1e-6;

    fn setup() -> (AnimationScheduler, ManualClock, Arc<StyleTable>, RotationController) {
        let clock = ManualClock::new();
        let table = Arc::new(StyleTable::new());
        let scheduler = AnimationScheduler::with_clock(table.clone(), Arc::new(clock.clone()));
        let controller = RotationController::new(scheduler.handle());
        (scheduler, clock, table, controller)
    }

    fn angle(table: &StyleTable, target: &VisualTarget) -> f64 {
        table
            .get(target.id(), ROTATION_SLOT)
            .and_then(|style| style.rotate_degrees)
            .unwrap()
    }

    #[test]
    fn test_continuous_follows_sine_round_trip() {
        let (scheduler, clock, table, controller) = setup();
        let star = VisualTarget::new("star");
        controller
            .start_continuous(&star, Duration::from_secs(5))
            .unwrap();
        assert_eq!(angle(&table, &star), 0.0);

        for elapsed in [0, 1250, 2500, 3750] {
            clock.set(elapsed);
            scheduler.tick();
            let p = elapsed as f64 / 5000.0;
            assert!((angle(&table, &star) - sine_round_trip(p) * 360.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_continuous_resets_on_even_cycles() {
        let (scheduler, clock, table, controller) = setup();
        let star = VisualTarget::new("star");
        controller
            .start_continuous(&star, Duration::from_millis(1000))
            .unwrap();

        // First boundary: odd cycle, the curve restarts from progress 0
        clock.set(1000);
        scheduler.tick();
        assert!((angle(&table, &star) - sine_round_trip(0.0) * 360.0).abs() < EPSILON);

        clock.set(1250);
        scheduler.tick();
        assert!((angle(&table, &star) - 360.0).abs() < EPSILON);

        // Second boundary: hard reset to exactly zero
        clock.set(2000);
        scheduler.tick();
        assert_eq!(angle(&table, &star), 0.0);

        // Never finishes on its own
        clock.set(60_000);
        assert!(scheduler.tick());
        assert!(controller.is_active(&star));
    }

    #[test]
    fn test_pushback_lands_on_exact_angle() {
        let (scheduler, clock, table, controller) = setup();
        let star = VisualTarget::new("star");
        controller
            .start_pushback(&star, 360.0, Duration::from_secs(6))
            .unwrap();

        clock.set(3000);
        scheduler.tick();
        assert!((angle(&table, &star) - back_overshoot(0.5) * 360.0).abs() < EPSILON);

        clock.set(6000);
        assert!(!scheduler.tick());
        assert_eq!(angle(&table, &star), 360.0);
        assert!(!controller.is_active(&star));
        assert_eq!(scheduler.active_for(star.id(), AnimationKind::Rotation), None);
    }

    #[test]
    fn test_pushback_overshoots_before_settling() {
        let (scheduler, clock, table, controller) = setup();
        let star = VisualTarget::new("star");
        controller
            .start_pushback(&star, 360.0, Duration::from_millis(1000))
            .unwrap();

        let mut peak: f64 = 0.0;
        for t in (16..1000).step_by(16) {
            clock.set(t);
            scheduler.tick();
            peak = peak.max(angle(&table, &star));
        }
        assert!(peak > 360.0);
    }

    #[test]
    fn test_pushback_finishes_within_one_tick_of_duration() {
        // (duration, cadence): aligned, unaligned, cadence equal to duration, 1ms ticks
        let cases = [
            (100, 16),
            (1000, 16),
            (250, 60),
            (97, 10),
            (100, 100),
            (40, 1),
            (6000, 33),
        ];
        for (duration_ms, cadence_ms) in cases {
            let (scheduler, clock, table, controller) = setup();
            let star = VisualTarget::new("star");
            let id = controller
                .start_pushback(&star, 360.0, Duration::from_millis(duration_ms))
                .unwrap();

            let mut t = 0;
            while scheduler.contains(id) {
                t += cadence_ms;
                clock.set(t);
                scheduler.tick();
            }
            assert!(
                t >= duration_ms && t < duration_ms + cadence_ms,
                "d={duration_ms} cadence={cadence_ms} finished at {t}"
            );
            assert_eq!(angle(&table, &star), 360.0);
        }
    }

    #[test]
    fn test_start_replaces_previous_rotation() {
        let (scheduler, clock, table, controller) = setup();
        let star = VisualTarget::new("star");
        let pushback = controller
            .start_pushback(&star, 360.0, Duration::from_secs(6))
            .unwrap();
        clock.set(500);
        scheduler.tick();

        let continuous = controller
            .start_continuous(&star, Duration::from_secs(5))
            .unwrap();
        assert!(!scheduler.contains(pushback));
        assert_eq!(scheduler.animation_count(), 1);
        assert_eq!(
            scheduler.active_for(star.id(), AnimationKind::Rotation),
            Some(continuous)
        );
        // Replacement snaps to zero before the new curve takes over
        assert_eq!(angle(&table, &star), 0.0);
    }

    #[test]
    fn test_reset_cancels_and_zeroes() {
        let (scheduler, clock, table, controller) = setup();
        let star = VisualTarget::new("star");
        controller
            .start_continuous(&star, Duration::from_secs(5))
            .unwrap();
        clock.set(1250);
        scheduler.tick();

        controller.reset(&star).unwrap();
        assert!(!controller.is_active(&star));
        assert_eq!(angle(&table, &star), 0.0);

        // Resetting an idle target is harmless
        controller.reset(&star).unwrap();
        assert_eq!(scheduler.completed_count(), 1);
    }

    #[test]
    fn test_zero_duration_rejected_without_side_effects() {
        let (scheduler, _clock, table, controller) = setup();
        let star = VisualTarget::new("star");

        let err = controller
            .start_continuous(&star, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, AnimationError::InvalidDuration { .. }));
        let err = controller
            .start_pushback(&star, f64::NAN, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, AnimationError::InvalidParameter { .. }));

        assert_eq!(scheduler.animation_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_instance_tracks_current_angle() {
        let table = StyleTable::new();
        let star = VisualTarget::new("star");
        let window =
            TimingWindow::new(AnimationKind::Rotation, "cycle", 0, Duration::from_millis(400))
                .unwrap();
        let mut animation = RotationAnimation::new(
            &star,
            window,
            RotationMode::Continuous { cycle_count: 0 },
            StylePriority::APPLICATION.above(1),
        );
        assert!(animation.is_continuous());

        animation.update(100, &table).unwrap();
        assert!((animation.current_angle() - 360.0).abs() < EPSILON);
        assert_eq!(animation.target_id(), star.id());
    }
}
