//! Easing functions
//!
//! Each function maps normalized progress `p` in `[0, 1]` to eased progress.
//! Inputs outside that range are not meaningful; callers clamp first.

use std::f64::consts::{FRAC_PI_2, TAU};

/// Overshoot strength of [`back_overshoot`]
pub const BACK_C1: f64 = 1.70158;
/// Cubic coefficient of [`back_overshoot`]
pub const BACK_C3: f64 = BACK_C1 + 1.0;

/// Identity easing
pub fn linear(p: f64) -> f64 {
    p
}

/// One full sine oscillation around 0.5: `0.5 + 0.5 * sin(2*pi*p)`
pub fn sine_round_trip(p: f64) -> f64 {
    0.5 + 0.5 * (TAU * p).sin()
}

/// Ease-out-back: runs past 1.0 before settling back onto it
pub fn back_overshoot(p: f64) -> f64 {
    let q = p - 1.0;
    1.0 + BACK_C3 * q.powi(3) + BACK_C1 * q.powi(2)
}

/// Quadratic ease-in-out
pub fn ease_in_out_quad(p: f64) -> f64 {
    if p < 0.5 {
        2.0 * p * p
    } else {
        1.0 - 2.0 * (1.0 - p) * (1.0 - p)
    }
}

/// First quarter of a sine wave: `sin(p * pi/2)`
pub fn ease_sine_half(p: f64) -> f64 {
    (p * FRAC_PI_2).sin()
}

/// Named easing curves, for callers that pick a curve at runtime
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    SineRoundTrip,
    BackOvershoot,
    EaseInOutQuad,
    EaseSineHalf,
}

impl Easing {
    /// Apply easing to a progress value
    pub fn apply(&self, p: f64) -> f64 {
        match self {
            Easing::Linear => linear(p),
            Easing::SineRoundTrip => sine_round_trip(p),
            Easing::BackOvershoot => back_overshoot(p),
            Easing::EaseInOutQuad => ease_in_out_quad(p),
            Easing::EaseSineHalf => ease_sine_half(p),
        }
    }
}
