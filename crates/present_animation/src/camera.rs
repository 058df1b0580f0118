//! Camera controller
//!
//! Moves a container vertically while rotating a separate target, each on
//! its own timing window and easing curve. Both windows open at the same
//! instant. An axis whose window has elapsed stops writing, so its last
//! applied value stays frozen while the other axis keeps going; the
//! instance finishes once both have elapsed.

use std::f64::consts::PI;
use std::time::Duration;

use crate::animation::{ensure_finite, Animation, AnimationKind, AnimationStatus, TimingWindow};
use crate::config::AnimationConfig;
use crate::easing::Easing;
use crate::error::Result;
use crate::scheduler::{AnimationId, SchedulerHandle};
use crate::style::{
    StyleDescription, StyleLayer, StylePriority, StyleSink, StyleSlot, TargetId, VisualTarget,
    WeakTarget,
};
use crate::values::Range;

/// Slot on the container: translation plus the final rotation
pub const CAMERA_TRANSLATE_SLOT: StyleSlot =
    StyleSlot::new(AnimationKind::Camera, StyleLayer::Translate);

/// Slot on the rotated target
pub const CAMERA_ROTATION_SLOT: StyleSlot =
    StyleSlot::new(AnimationKind::Camera, StyleLayer::Rotation);

/// One eased scalar moving over its own window
#[derive(Clone, Copy, Debug)]
struct Axis {
    window: TimingWindow,
    range: Range<f64>,
    easing: Easing,
}

impl Axis {
    /// Eased value at `now_ms`, or `None` once the window has elapsed
    fn sample(&self, now_ms: u64) -> Option<f64> {
        let progress = self.window.progress(now_ms);
        if progress >= 1.0 {
            None
        } else {
            Some(self.range.at(self.easing.apply(progress)))
        }
    }
}

/// A running camera move
pub struct CameraAnimation {
    move_target: WeakTarget,
    rotate_target: WeakTarget,
    container: WeakTarget,
    movement: Axis,
    rotation: Axis,
    rotation_priority: StylePriority,
    container_priority: StylePriority,
}

impl CameraAnimation {
    /// Target rotation in degrees, carried by every container transform
    pub fn target_rotation_degrees(&self) -> f64 {
        self.rotation.range.to
    }
}

impl Animation for CameraAnimation {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Camera
    }

    fn target_id(&self) -> TargetId {
        self.move_target.id()
    }

    fn update(&mut self, now_ms: u64, sink: &dyn StyleSink) -> Result<AnimationStatus> {
        self.move_target.resolve()?;

        let y = self.movement.sample(now_ms);
        let angle = self.rotation.sample(now_ms);

        if let Some(y) = y {
            let container = self.container.resolve()?;
            sink.apply_style(
                &container,
                CAMERA_TRANSLATE_SLOT,
                &StyleDescription::new()
                    .with_translate_y(y)
                    .with_rotation(self.target_rotation_degrees()),
                self.container_priority,
            );
        }

        if let Some(angle) = angle {
            let rotate_target = self.rotate_target.resolve()?;
            sink.apply_style(
                &rotate_target,
                CAMERA_ROTATION_SLOT,
                &StyleDescription::rotation(angle),
                self.rotation_priority,
            );
        }

        if y.is_none() && angle.is_none() {
            tracing::info!("Camera movement complete");
            Ok(AnimationStatus::Finished)
        } else {
            Ok(AnimationStatus::Running)
        }
    }
}

/// Starts camera moves
#[derive(Clone)]
pub struct CameraController {
    handle: SchedulerHandle,
    rotation_priority: StylePriority,
    container_priority: StylePriority,
}

impl CameraController {
    pub fn new(handle: SchedulerHandle) -> Self {
        Self::with_config(handle, &AnimationConfig::default())
    }

    pub fn with_config(handle: SchedulerHandle, config: &AnimationConfig) -> Self {
        Self {
            handle,
            rotation_priority: config.style.animation_priority(),
            container_priority: config.style.camera_priority(),
        }
    }

    /// Slide `container` to `target_y` and turn `rotate_target` to
    /// `target_rotation_radians`, both starting from rest
    ///
    /// The instance is registered under `move_target`; any camera move
    /// already registered there is cancelled first.
    #[allow(clippy::too_many_arguments)]
    pub fn move_and_rotate(
        &self,
        move_target: &VisualTarget,
        rotate_target: &VisualTarget,
        container: &VisualTarget,
        target_y: f64,
        target_rotation_radians: f64,
        move_duration: Duration,
        rotate_duration: Duration,
    ) -> Result<AnimationId> {
        let target_y = ensure_finite(AnimationKind::Camera, "target y", target_y)?;
        let target_rotation = ensure_finite(
            AnimationKind::Camera,
            "target rotation",
            target_rotation_radians,
        )? * 180.0
            / PI;

        let now = self.handle.now_ms()?;
        let movement = Axis {
            window: TimingWindow::new(AnimationKind::Camera, "move duration", now, move_duration)?,
            range: Range::new(0.0, target_y),
            easing: Easing::EaseInOutQuad,
        };
        let rotation = Axis {
            window: TimingWindow::new(
                AnimationKind::Camera,
                "rotate duration",
                now,
                rotate_duration,
            )?,
            range: Range::new(0.0, target_rotation),
            easing: Easing::EaseSineHalf,
        };

        self.handle.detach(move_target.id(), AnimationKind::Camera);

        let animation = CameraAnimation {
            move_target: move_target.downgrade(),
            rotate_target: rotate_target.downgrade(),
            container: container.downgrade(),
            movement,
            rotation,
            rotation_priority: self.rotation_priority,
            container_priority: self.container_priority,
        };
        let id = self.handle.attach(Box::new(animation))?;
        tracing::info!(
            "Camera move started on {}: y -> {}px over {}ms, rotation -> {:.2}deg over {}ms",
            move_target.label(),
            target_y,
            movement.window.duration_ms(),
            target_rotation,
            rotation.window.duration_ms()
        );
        Ok(id)
    }

    pub fn is_active(&self, move_target: &VisualTarget) -> bool {
        self.handle.is_active(move_target.id(), AnimationKind::Camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::easing::{ease_in_out_quad, ease_sine_half};
    use crate::error::AnimationError;
    use crate::scheduler::AnimationScheduler;
    use crate::style::StyleTable;
    use std::sync::Arc;

    const EPSILON: f64 = 1e-9;

    struct Scene {
        camera: VisualTarget,
        slides: VisualTarget,
        container: VisualTarget,
    }

    impl Scene {
        fn new() -> Self {
            Self {
                camera: VisualTarget::new("camera"),
                slides: VisualTarget::new("slides"),
                container: VisualTarget::new("container"),
            }
        }

        fn start(
            &self,
            controller: &CameraController,
            move_ms: u64,
            rotate_ms: u64,
        ) -> Result<AnimationId> {
            controller.move_and_rotate(
                &self.camera,
                &self.slides,
                &self.container,
                -1300.0,
                3.0,
                Duration::from_millis(move_ms),
                Duration::from_millis(rotate_ms),
            )
        }

        fn container_style(&self, table: &StyleTable) -> StyleDescription {
            table
                .get(self.container.id(), CAMERA_TRANSLATE_SLOT)
                .unwrap()
        }

        fn slides_angle(&self, table: &StyleTable) -> f64 {
            table
                .get(self.slides.id(), CAMERA_ROTATION_SLOT)
                .and_then(|style| style.rotate_degrees)
                .unwrap()
        }
    }

    fn setup() -> (AnimationScheduler, ManualClock, Arc<StyleTable>, CameraController) {
        let clock = ManualClock::new();
        let table = Arc::new(StyleTable::new());
        let scheduler = AnimationScheduler::with_clock(table.clone(), Arc::new(clock.clone()));
        let controller = CameraController::new(scheduler.handle());
        (scheduler, clock, table, controller)
    }

    fn target_degrees() -> f64 {
        3.0 * 180.0 / PI
    }

    #[test]
    fn test_axes_follow_their_easings() {
        let (scheduler, clock, table, controller) = setup();
        let scene = Scene::new();
        scene.start(&controller, 2000, 4000).unwrap();

        clock.set(500);
        scheduler.tick();

        let container = scene.container_style(&table);
        let expected_y = -1300.0 * ease_in_out_quad(0.25);
        assert!((container.translate_y_px.unwrap() - expected_y).abs() < EPSILON);
        assert!((container.rotate_degrees.unwrap() - target_degrees()).abs() < EPSILON);

        let expected_angle = target_degrees() * ease_sine_half(0.125);
        assert!((scene.slides_angle(&table) - expected_angle).abs() < EPSILON);
    }

    #[test]
    fn test_shorter_axis_freezes_while_longer_runs() {
        let (scheduler, clock, table, controller) = setup();
        let scene = Scene::new();
        let id = scene.start(&controller, 2000, 4000).unwrap();

        clock.set(1984);
        scheduler.tick();
        let frozen = scene.container_style(&table);

        for t in [2000, 2500, 3000, 3500, 3984] {
            clock.set(t);
            assert!(scheduler.tick());
            assert!(scheduler.contains(id));
            assert_eq!(scene.container_style(&table), frozen);
        }
        assert!(scene.slides_angle(&table) > 0.0);

        clock.set(4000);
        assert!(!scheduler.tick());
        assert!(!controller.is_active(&scene.camera));
    }

    #[test]
    fn test_rotation_freezes_when_it_ends_first() {
        let (scheduler, clock, table, controller) = setup();
        let scene = Scene::new();
        scene.start(&controller, 3000, 1000).unwrap();

        clock.set(992);
        scheduler.tick();
        let frozen = scene.slides_angle(&table);

        clock.set(1500);
        scheduler.tick();
        assert_eq!(scene.slides_angle(&table), frozen);
        assert!(controller.is_active(&scene.camera));

        clock.set(3000);
        assert!(!scheduler.tick());
    }

    #[test]
    fn test_restart_replaces_camera_move() {
        let (scheduler, _clock, _table, controller) = setup();
        let scene = Scene::new();
        let first = scene.start(&controller, 2000, 4000).unwrap();
        let second = scene.start(&controller, 1000, 1000).unwrap();

        assert!(!scheduler.contains(first));
        assert_eq!(
            scheduler.active_for(scene.camera.id(), AnimationKind::Camera),
            Some(second)
        );
        assert_eq!(scheduler.completed_count(), 1);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let (scheduler, _clock, _table, controller) = setup();
        let scene = Scene::new();

        let err = scene.start(&controller, 0, 4000).unwrap_err();
        assert!(matches!(
            err,
            AnimationError::InvalidDuration {
                kind: AnimationKind::Camera,
                what: "move duration"
            }
        ));

        let err = controller
            .move_and_rotate(
                &scene.camera,
                &scene.slides,
                &scene.container,
                f64::INFINITY,
                1.0,
                Duration::from_secs(1),
                Duration::from_secs(1),
            )
            .unwrap_err();
        assert!(matches!(err, AnimationError::InvalidParameter { .. }));
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_dropped_container_ends_move() {
        let (scheduler, clock, _table, controller) = setup();
        let Scene {
            camera,
            slides,
            container,
        } = Scene::new();
        controller
            .move_and_rotate(
                &camera,
                &slides,
                &container,
                -100.0,
                1.0,
                Duration::from_secs(1),
                Duration::from_secs(1),
            )
            .unwrap();

        drop(container);
        clock.set(16);
        assert!(!scheduler.tick());
        assert!(!controller.is_active(&camera));
    }

    #[test]
    fn test_container_uses_camera_priority() {
        let (scheduler, clock, table, controller) = setup();
        let scene = Scene::new();
        scene.start(&controller, 2000, 4000).unwrap();
        clock.set(16);
        scheduler.tick();

        let snapshot = table.snapshot();
        let container = snapshot
            .iter()
            .find(|entry| entry.target == scene.container.id())
            .unwrap();
        let slides = snapshot
            .iter()
            .find(|entry| entry.target == scene.slides.id())
            .unwrap();
        assert_eq!(container.priority, StylePriority(602));
        assert_eq!(slides.priority, StylePriority(601));
    }
}
