//! Configuration file handling for the headless driver
//!
//! Animation timings live in `present-anim.toml`. When `--config` names a
//! file it must exist; otherwise the file in the working directory is used if
//! present, and the stock timings if not.

use anyhow::{Context, Result};
use present_animation::AnimationConfig;
use std::path::Path;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "present-anim.toml";

/// Load the animation configuration
pub fn load(path: Option<&Path>) -> Result<AnimationConfig> {
    match path {
        Some(path) => AnimationConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AnimationConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
            .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE)),
    }
}

/// Serialize to TOML string
pub fn to_toml(config: &AnimationConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}
