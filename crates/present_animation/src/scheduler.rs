//! Animation scheduler
//!
//! One tick loop drives every live animation instance. Each tick reads the
//! clock once, calls every instance's update in registration order, and
//! removes the instances that finished or failed.
//!
//! The target registry lives behind the same lock as the instance table, so
//! replacing an animation (evict, tear down, install) is atomic with respect
//! to ticks, even when the loop runs on its own thread via
//! [`AnimationScheduler::start_background`].

use crate::animation::{Animation, AnimationKind, AnimationStatus};
use crate::clock::{Clock, MonotonicClock};
use crate::config::SchedulerConfig;
use crate::error::{AnimationError, Result};
use crate::registry::TargetRegistry;
use crate::style::{StyleDescription, StylePriority, StyleSink, StyleSlot, TargetId, VisualTarget};
use slotmap::{new_key_type, SlotMap};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// ============================================================================
// Global Animation Scheduler State
// ============================================================================

/// Global scheduler handle for access from anywhere in the application
static GLOBAL_SCHEDULER: OnceLock<SchedulerHandle> = OnceLock::new();

/// Set the global animation scheduler handle
///
/// Called once at startup, after the scheduler is created. A second call is
/// rejected and leaves the first handle in place.
pub fn set_global_scheduler(handle: SchedulerHandle) -> Result<()> {
    GLOBAL_SCHEDULER
        .set(handle)
        .map_err(|_| AnimationError::SchedulerAlreadyInitialized)
}

/// Get the global animation scheduler handle
pub fn get_scheduler() -> Result<SchedulerHandle> {
    GLOBAL_SCHEDULER
        .get()
        .cloned()
        .ok_or(AnimationError::SchedulerNotInitialized)
}

/// Try to get the global scheduler (returns None if not initialized)
pub fn try_get_scheduler() -> Option<SchedulerHandle> {
    GLOBAL_SCHEDULER.get().cloned()
}

/// Check if the global scheduler has been initialized
pub fn is_scheduler_initialized() -> bool {
    GLOBAL_SCHEDULER.get().is_some()
}

new_key_type! {
    /// Registration token of a live animation instance
    pub struct AnimationId;
}

struct Entry {
    kind: AnimationKind,
    target: TargetId,
    animation: Box<dyn Animation>,
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    animations: SlotMap<AnimationId, Entry>,
    /// Registration order; ticks visit instances in this order
    order: Vec<AnimationId>,
    registry: TargetRegistry,
    /// Instances torn down so far
    completed: u64,
}

impl SchedulerInner {
    fn new() -> Self {
        Self {
            animations: SlotMap::with_key(),
            order: Vec::new(),
            registry: TargetRegistry::new(),
            completed: 0,
        }
    }

    /// Install an instance, first tearing down whatever held its slot
    fn attach(&mut self, animation: Box<dyn Animation>) -> AnimationId {
        let kind = animation.kind();
        let target = animation.target_id();

        if let Some(previous) = self.registry.detach(target, kind) {
            tracing::debug!("Replacing {} animation on target {}", kind, target);
            self.remove(previous);
        }

        let id = self.animations.insert(Entry {
            kind,
            target,
            animation,
        });
        self.order.push(id);
        self.registry.attach(target, kind, id);
        tracing::debug!("Attached {} animation to target {}", kind, target);
        id
    }

    /// Cancel an instance's registration, then tear it down
    ///
    /// Returns false if `id` is not live, which makes repeated cancellation
    /// harmless.
    fn remove(&mut self, id: AnimationId) -> bool {
        let Some(mut entry) = self.animations.remove(id) else {
            return false;
        };
        self.order.retain(|live| *live != id);
        self.registry.release(entry.target, entry.kind, id);
        entry.animation.teardown();
        self.completed += 1;
        tracing::debug!(
            "Tore down {} animation on target {}",
            entry.kind,
            entry.target
        );
        true
    }

    /// Update every instance at `now_ms`
    ///
    /// Returns true if any instance is still live afterwards.
    fn tick(&mut self, now_ms: u64, sink: &dyn StyleSink) -> bool {
        let mut finished = Vec::new();

        for &id in &self.order {
            let Some(entry) = self.animations.get_mut(id) else {
                continue;
            };
            let kind = entry.kind;
            let target = entry.target;

            // A fault in one instance must not take the loop down with it
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                entry.animation.update(now_ms, sink)
            }))
            .unwrap_or_else(|payload| {
                Err(AnimationError::UpdatePanicked {
                    kind,
                    message: panic_message(payload.as_ref()),
                })
            });

            match outcome {
                Ok(AnimationStatus::Running) => {}
                Ok(AnimationStatus::Finished) => {
                    tracing::debug!("{} animation on target {} finished", kind, target);
                    finished.push(id);
                }
                Err(err) => {
                    tracing::warn!("{} animation on target {} stopped: {}", kind, target, err);
                    finished.push(id);
                }
            }
        }

        for id in finished {
            self.remove(id);
        }

        !self.animations.is_empty()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// State shared between the scheduler, its handles and the tick thread
struct SchedulerCore {
    state: Mutex<SchedulerInner>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn StyleSink>,
}

impl SchedulerCore {
    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> bool {
        let now = self.clock.now_ms();
        self.lock().tick(now, self.sink.as_ref())
    }
}

/// The animation scheduler that ticks all active animations
///
/// Owns the instance table, the target registry, the clock and the style
/// sink. Controllers talk to it through a [`SchedulerHandle`].
///
/// # Background Thread Mode
///
/// The scheduler can tick on its own thread via `start_background()`, at
/// the configured interval (16ms by default). Without it, the embedding
/// application calls [`tick`](Self::tick) from its own frame loop.
///
/// ```ignore
/// let table = Arc::new(StyleTable::new());
/// let mut scheduler = AnimationScheduler::new(table.clone());
/// scheduler.start_background();
/// ```
pub struct AnimationScheduler {
    core: Arc<SchedulerCore>,
    /// Stop signal for background thread
    stop_flag: Arc<AtomicBool>,
    tick_interval: Duration,
    /// Background thread handle (if running)
    thread_handle: Option<JoinHandle<()>>,
}

impl AnimationScheduler {
    /// Create a scheduler driven by a [`MonotonicClock`]
    pub fn new(sink: Arc<dyn StyleSink>) -> Self {
        Self::with_clock(sink, Arc::new(MonotonicClock::new()))
    }

    /// Create a scheduler reading time from `clock`
    pub fn with_clock(sink: Arc<dyn StyleSink>, clock: Arc<dyn Clock>) -> Self {
        Self::from_config(sink, clock, &SchedulerConfig::default())
    }

    pub fn from_config(
        sink: Arc<dyn StyleSink>,
        clock: Arc<dyn Clock>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            core: Arc::new(SchedulerCore {
                state: Mutex::new(SchedulerInner::new()),
                clock,
                sink,
            }),
            stop_flag: Arc::new(AtomicBool::new(false)),
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            thread_handle: None,
        }
    }

    /// Start ticking on a background thread
    ///
    /// Does nothing if the thread is already running.
    pub fn start_background(&mut self) {
        if self.thread_handle.is_some() {
            return; // Already running
        }

        let core = Arc::clone(&self.core);
        let stop_flag = Arc::clone(&self.stop_flag);
        let frame_duration = self.tick_interval;

        tracing::debug!(
            "Starting animation tick thread ({}ms interval)",
            frame_duration.as_millis()
        );

        self.thread_handle = Some(thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();

                core.tick();

                // Sleep for remaining frame time
                let elapsed = start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }));
    }

    /// Stop the background thread
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            tracing::debug!("Animation tick thread stopped");
        }
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    /// Check if the background thread is running
    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Get a handle to this scheduler for passing to controllers
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            core: Arc::downgrade(&self.core),
        }
    }

    /// Tick all animations
    ///
    /// Returns true if any animations are still active (need another tick).
    pub fn tick(&self) -> bool {
        self.core.tick()
    }

    /// Current clock reading
    pub fn now_ms(&self) -> u64 {
        self.core.clock.now_ms()
    }

    /// Check if any animations are still active
    pub fn has_active_animations(&self) -> bool {
        !self.core.lock().animations.is_empty()
    }

    /// Number of live instances
    pub fn animation_count(&self) -> usize {
        self.core.lock().animations.len()
    }

    /// Number of instances torn down since the scheduler was created
    pub fn completed_count(&self) -> u64 {
        self.core.lock().completed
    }

    /// Check whether `id` is still registered
    pub fn contains(&self, id: AnimationId) -> bool {
        self.core.lock().animations.contains_key(id)
    }

    /// The instance animating `(target, kind)`, if any
    pub fn active_for(&self, target: TargetId, kind: AnimationKind) -> Option<AnimationId> {
        self.core.lock().registry.get(target, kind)
    }

    /// Number of kinds currently animating `target`
    pub fn kinds_on(&self, target: TargetId) -> usize {
        self.core.lock().registry.count_for_target(target)
    }

    /// Cancel and tear down an instance
    pub fn cancel(&self, id: AnimationId) -> bool {
        self.core.lock().remove(id)
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        // Stop background thread when scheduler is dropped
        self.stop_background();
    }
}

/// A weak handle to the animation scheduler
///
/// This is passed to controllers that need to register animations.
/// It won't prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    core: Weak<SchedulerCore>,
}

impl SchedulerHandle {
    fn core(&self) -> Result<Arc<SchedulerCore>> {
        self.core.upgrade().ok_or(AnimationError::SchedulerDropped)
    }

    /// Register an instance under its `(target, kind)` slot
    ///
    /// Any instance already in that slot is cancelled and torn down first.
    pub fn attach(&self, animation: Box<dyn Animation>) -> Result<AnimationId> {
        let core = self.core()?;
        let id = core.lock().attach(animation);
        Ok(id)
    }

    /// Cancel whatever animates `(target, kind)`
    ///
    /// Returns true if an instance was torn down.
    pub fn detach(&self, target: TargetId, kind: AnimationKind) -> bool {
        let Ok(core) = self.core() else {
            return false;
        };
        let mut inner = core.lock();
        match inner.registry.detach(target, kind) {
            Some(id) => inner.remove(id),
            None => false,
        }
    }

    /// Cancel and tear down an instance by id
    pub fn cancel(&self, id: AnimationId) -> bool {
        self.core
            .upgrade()
            .map(|core| core.lock().remove(id))
            .unwrap_or(false)
    }

    /// The instance animating `(target, kind)`, if any
    pub fn active_for(&self, target: TargetId, kind: AnimationKind) -> Option<AnimationId> {
        self.core
            .upgrade()
            .and_then(|core| core.lock().registry.get(target, kind))
    }

    /// Check whether `(target, kind)` is being animated
    ///
    /// This is the single source of truth for "is this animation still
    /// running"; UI code should poll it rather than arm its own timers.
    pub fn is_active(&self, target: TargetId, kind: AnimationKind) -> bool {
        self.active_for(target, kind).is_some()
    }

    /// Current clock reading
    pub fn now_ms(&self) -> Result<u64> {
        Ok(self.core()?.clock.now_ms())
    }

    /// Apply a style immediately, outside any animation instance
    pub fn apply_style(
        &self,
        target: &VisualTarget,
        slot: StyleSlot,
        style: &StyleDescription,
        priority: StylePriority,
    ) -> Result<()> {
        let core = self.core()?;
        core.sink.apply_style(target, slot, style, priority);
        Ok(())
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.core.strong_count() > 0
    }
}
