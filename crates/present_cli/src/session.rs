//! Headless animation session
//!
//! A stage of named targets, a scheduler writing into an in-memory style
//! table, and a clock that is either simulated (stepped one tick interval at
//! a time, no sleeping) or real (background tick thread).

use present_animation::{
    AnimationConfig, AnimationKind, AnimationScheduler, AppliedStyle, Clock, ManualClock,
    SchedulerHandle, StyleTable, VisualTarget,
};
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// The targets the driver animates
pub struct Stage {
    /// Rotation and pulse target
    pub star: VisualTarget,
    /// Camera registration target
    pub camera: VisualTarget,
    /// Rotated by the camera move
    pub slides: VisualTarget,
    /// Translated by the camera move
    pub container: VisualTarget,
}

impl Stage {
    fn new() -> Self {
        Self {
            star: VisualTarget::new("star"),
            camera: VisualTarget::new("camera"),
            slides: VisualTarget::new("slides"),
            container: VisualTarget::new("container"),
        }
    }

    fn targets(&self) -> [&VisualTarget; 4] {
        [&self.star, &self.camera, &self.slides, &self.container]
    }
}

/// An animation still registered when the run ended
#[derive(Debug, Serialize)]
pub struct ActiveAnimation {
    pub target: String,
    pub kind: AnimationKind,
}

/// What a run left behind
#[derive(Debug, Serialize)]
pub struct Report {
    pub elapsed_ms: u64,
    /// Ticks driven; unknown in realtime mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<u64>,
    pub completed_animations: u64,
    pub styles_applied: u64,
    pub active: Vec<ActiveAnimation>,
    pub styles: Vec<AppliedStyle>,
}

pub struct Session {
    scheduler: AnimationScheduler,
    table: Arc<StyleTable>,
    /// Present in simulated mode
    clock: Option<ManualClock>,
    config: AnimationConfig,
    started_ms: u64,
    ticks: u64,
    pub stage: Stage,
}

impl Session {
    pub fn new(config: AnimationConfig, realtime: bool) -> Self {
        let table = Arc::new(StyleTable::new());
        let (scheduler, clock) = if realtime {
            let scheduler = AnimationScheduler::from_config(
                table.clone(),
                Arc::new(present_animation::MonotonicClock::new()),
                &config.scheduler,
            );
            (scheduler, None)
        } else {
            let clock = ManualClock::new();
            let scheduler = AnimationScheduler::from_config(
                table.clone(),
                Arc::new(clock.clone()),
                &config.scheduler,
            );
            (scheduler, Some(clock))
        };
        let started_ms = scheduler.now_ms();

        Self {
            scheduler,
            table,
            clock,
            config,
            started_ms,
            ticks: 0,
            stage: Stage::new(),
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Drive the scheduler for `run_ms`
    ///
    /// In simulated mode the run ends early once nothing is left to animate.
    pub fn run_for(&mut self, run_ms: u64) {
        match &self.clock {
            Some(clock) => {
                let step = self.scheduler.tick_interval().as_millis().max(1) as u64;
                let end = clock.now_ms() + run_ms;
                loop {
                    let live = self.scheduler.tick();
                    self.ticks += 1;
                    if !live {
                        debug!("No animations left after {} ticks", self.ticks);
                        break;
                    }
                    let now = clock.now_ms();
                    if now >= end {
                        break;
                    }
                    clock.advance(step.min(end - now));
                }
            }
            None => {
                self.scheduler.start_background();
                thread::sleep(Duration::from_millis(run_ms));
                self.scheduler.stop_background();
            }
        }
        info!(
            "Ran for {}ms: {} live, {} completed",
            self.scheduler.now_ms().saturating_sub(self.started_ms),
            self.scheduler.animation_count(),
            self.scheduler.completed_count()
        );
    }

    pub fn report(&self) -> Report {
        let handle = self.handle();
        let kinds = [
            AnimationKind::Rotation,
            AnimationKind::Pulse,
            AnimationKind::Camera,
        ];
        let active = self
            .stage
            .targets()
            .into_iter()
            .flat_map(|target| {
                kinds
                    .iter()
                    .filter(|kind| handle.is_active(target.id(), **kind))
                    .map(|kind| ActiveAnimation {
                        target: target.label().to_string(),
                        kind: *kind,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Report {
            elapsed_ms: self.scheduler.now_ms().saturating_sub(self.started_ms),
            ticks: self.clock.as_ref().map(|_| self.ticks),
            completed_animations: self.scheduler.completed_count(),
            styles_applied: self.table.apply_count(),
            active,
            styles: self.table.snapshot(),
        }
    }
}
