//! Animatable value types
//!
//! Linear interpolation for the scalar quantities the controllers drive:
//! angles, pixel offsets, opacity and scale.

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t
    ///
    /// `t` is normally in `[0, 1]`, but overshooting curves may push it past
    /// either end; the result then extrapolates along the same line.
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

/// A `from -> to` pair of values
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range<T> {
    pub from: T,
    pub to: T,
}

impl<T: Interpolate> Range<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }

    /// Value at factor `t` along the range
    pub fn at(&self, t: f64) -> T {
        self.from.lerp(&self.to, t)
    }

    /// The same range walked backwards
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_lerp() {
        assert_eq!(0.0_f64.lerp(&10.0, 0.0), 0.0);
        assert_eq!(0.0_f64.lerp(&10.0, 0.5), 5.0);
        assert_eq!(0.0_f64.lerp(&10.0, 1.0), 10.0);
    }

    #[test]
    fn test_lerp_extrapolates_past_one() {
        let v = 0.0_f64.lerp(&100.0, 1.1);
        assert!((v - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_range_reversed() {
        let fade = Range::new(1.0, 0.3);
        assert!((fade.at(0.5) - 0.65).abs() < 1e-12);
        let back = fade.reversed();
        assert!((back.at(0.0) - 0.3).abs() < 1e-12);
        assert!((back.at(1.0) - 1.0).abs() < 1e-12);
    }
}
