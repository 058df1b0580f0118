//! Animation configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file
//! at all) reproduces the stock timings:
//!
//! ```toml
//! [scheduler]
//! tick_interval_ms = 16
//!
//! [pulse]
//! phase_ms = 500
//! hold_ms = 1000
//! min_opacity = 0.3
//! max_opacity = 1.0
//! min_scale = 1.0
//! max_scale = 1.5
//!
//! [style]
//! animation_priority = 601
//! camera_priority = 602
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AnimationError, Result};
use crate::style::StylePriority;

/// Top-level animation configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AnimationConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub pulse: PulseConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

/// Tick loop settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Interval between background ticks
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    16
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

/// Pulse loop timings and ranges
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PulseConfig {
    /// Duration of each fade/scale phase
    #[serde(default = "default_phase_ms")]
    pub phase_ms: u64,
    /// Duration of the hold phase
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f64,
    #[serde(default = "default_one")]
    pub max_opacity: f64,
    #[serde(default = "default_one")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
}

fn default_phase_ms() -> u64 {
    500
}

fn default_hold_ms() -> u64 {
    1000
}

fn default_min_opacity() -> f64 {
    0.3
}

fn default_one() -> f64 {
    1.0
}

fn default_max_scale() -> f64 {
    1.5
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            phase_ms: default_phase_ms(),
            hold_ms: default_hold_ms(),
            min_opacity: default_min_opacity(),
            max_opacity: default_one(),
            min_scale: default_one(),
            max_scale: default_max_scale(),
        }
    }
}

/// Priorities the controllers install their styles at
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StyleConfig {
    /// Rotation and pulse slots
    #[serde(default = "default_animation_priority")]
    pub animation_priority: u32,
    /// Camera container translate slot
    #[serde(default = "default_camera_priority")]
    pub camera_priority: u32,
}

fn default_animation_priority() -> u32 {
    StylePriority::APPLICATION.above(1).0
}

fn default_camera_priority() -> u32 {
    StylePriority::APPLICATION.above(2).0
}

impl StyleConfig {
    pub fn animation_priority(&self) -> StylePriority {
        StylePriority(self.animation_priority)
    }

    pub fn camera_priority(&self) -> StylePriority {
        StylePriority(self.camera_priority)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            animation_priority: default_animation_priority(),
            camera_priority: default_camera_priority(),
        }
    }
}

impl AnimationConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(
                "No animation config at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnimationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make progress undefined
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("scheduler.tick_interval_ms", self.scheduler.tick_interval_ms),
            ("pulse.phase_ms", self.pulse.phase_ms),
            ("pulse.hold_ms", self.pulse.hold_ms),
        ];
        for (what, value) in durations {
            if value == 0 {
                return Err(AnimationError::InvalidConfig(format!(
                    "{what} must be greater than zero"
                )));
            }
        }

        let ranges = [
            ("pulse.min_opacity", self.pulse.min_opacity),
            ("pulse.max_opacity", self.pulse.max_opacity),
            ("pulse.min_scale", self.pulse.min_scale),
            ("pulse.max_scale", self.pulse.max_scale),
        ];
        for (what, value) in ranges {
            if !value.is_finite() {
                return Err(AnimationError::InvalidConfig(format!("{what} must be finite")));
            }
        }
        Ok(())
    }
}
