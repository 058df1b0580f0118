//! Error types for present_animation

use thiserror::Error;

use crate::animation::AnimationKind;
use crate::style::TargetId;

/// Errors produced by controllers, the scheduler and config loading
#[derive(Error, Debug)]
pub enum AnimationError {
    /// A timing window of zero length was requested
    #[error("{kind} animation rejected: {what} must be greater than zero")]
    InvalidDuration {
        kind: AnimationKind,
        what: &'static str,
    },

    /// A non-finite angle or offset was requested
    #[error("{kind} animation rejected: {what} must be finite")]
    InvalidParameter {
        kind: AnimationKind,
        what: &'static str,
    },

    /// A property name with no animation behind it
    #[error("Property '{0}' is not supported for animation")]
    UnsupportedProperty(String),

    /// The visual target was destroyed while an instance still referenced it
    #[error("Visual target {0} no longer exists")]
    TargetDropped(TargetId),

    /// A handle outlived its scheduler
    #[error("Animation scheduler has been dropped")]
    SchedulerDropped,

    /// The process-wide scheduler was never installed
    #[error("Animation scheduler not initialized. Call set_global_scheduler() at startup")]
    SchedulerNotInitialized,

    /// The process-wide scheduler was installed twice
    #[error("Animation scheduler already initialized")]
    SchedulerAlreadyInitialized,

    /// An instance panicked inside its update
    #[error("{kind} animation panicked during update: {message}")]
    UpdatePanicked {
        kind: AnimationKind,
        message: String,
    },

    /// Config values that would make timing undefined
    #[error("Invalid animation config: {0}")]
    InvalidConfig(String),

    /// Config file could not be read
    #[error("Failed to read animation config: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Config file is not valid TOML for `AnimationConfig`
    #[error("Failed to parse animation config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for present_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
