//! Present Animation System
//!
//! Time-driven visual animations for a presentation editor: rotation, an
//! opacity/scale pulse loop, and a two-axis camera move.
//!
//! # Features
//!
//! - **Single Tick Driver**: one scheduler updates every live animation per tick
//! - **Elapsed-Time Progress**: progress comes from the clock, never from tick counts
//! - **Target Registry**: at most one animation per (target, kind), replaced atomically
//! - **Layered Styles**: rotation, opacity/scale and translate are independent slots
//! - **Fault Isolation**: a failing or panicking animation only ends itself
//! - **Headless Friendly**: swap in a [`ManualClock`] and a [`StyleTable`] to drive
//!   animations deterministically
//!
//! # Example
//!
//! ```ignore
//! let table = Arc::new(StyleTable::new());
//! let mut scheduler = AnimationScheduler::new(table.clone());
//! scheduler.start_background();
//!
//! let star = VisualTarget::new("star");
//! RotationController::new(scheduler.handle())
//!     .start_continuous(&star, Duration::from_secs(5))?;
//! ```

pub mod animation;
pub mod camera;
pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod pulse;
pub mod registry;
pub mod rotation;
pub mod scheduler;
pub mod style;
pub mod values;

pub use animation::{Animation, AnimationKind, AnimationStatus, TimingWindow};
pub use camera::{CameraAnimation, CameraController, CAMERA_ROTATION_SLOT, CAMERA_TRANSLATE_SLOT};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{AnimationConfig, PulseConfig, SchedulerConfig, StyleConfig};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use pulse::{
    animate_property, PulseAnimation, PulseController, PulsePhase, PulseShape, PULSE_SLOT,
};
pub use registry::TargetRegistry;
pub use rotation::{RotationAnimation, RotationController, ROTATION_SLOT};
pub use scheduler::{
    get_scheduler, is_scheduler_initialized, set_global_scheduler, try_get_scheduler,
    AnimationId, AnimationScheduler, SchedulerHandle,
};
pub use style::{
    AppliedStyle, StyleDescription, StyleLayer, StylePriority, StyleSink, StyleSlot, StyleTable,
    TargetId, VisualTarget, WeakTarget,
};
pub use values::{Interpolate, Range};
