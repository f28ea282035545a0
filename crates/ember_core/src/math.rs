//! Ground-plane math shared by every subsystem.
//!
//! The presentation core works on the XZ plane: height (Y) is always derived
//! from an effect's own motion curve, never from the world.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

/// 2D position or direction on the ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Z component
    pub z: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Unit vector pointing along `angle` (radians, 0 = +Z, PI/2 = +X).
    #[must_use]
    pub fn from_heading(angle: f32) -> Self {
        Self::new(angle.sin(), angle.cos())
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.z * self.z
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Heading of this vector, matching [`Vec2::from_heading`].
    #[must_use]
    pub fn heading(self) -> f32 {
        self.x.atan2(self.z)
    }

    /// Linear interpolation towards `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.z * rhs)
    }
}

/// Wraps an angle into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed delta from `from` to `to` along the shorter arc.
#[must_use]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Moves `current` towards `target` by `t` of the shorter arc.
///
/// The result is wrapped, so easing from `+3.0` towards `-3.0` crosses PI
/// instead of sweeping back through zero.
#[must_use]
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    wrap_angle(current + shortest_angle_delta(current, target) * t.clamp(0.0, 1.0))
}

/// Quadratic ease-out: fast start, slow end.
#[inline]
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv
}

/// Quadratic ease-in: slow start, fast end.
#[inline]
#[must_use]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-7.0) - (-7.0 + TAU)).abs() < 1e-5);
    }

    #[test]
    fn test_shortest_delta_crosses_pi() {
        let delta = shortest_angle_delta(3.0, -3.0);
        assert!(delta > 0.0, "should go up through PI, got {delta}");
        assert!((delta - (TAU - 6.0)).abs() < 1e-5);
    }

    #[test]
    fn test_lerp_angle_takes_short_arc() {
        let next = lerp_angle(3.0, -3.0, 0.25);
        // Naive lerp would land on 1.5
        assert!(next > 3.0, "expected to move towards PI, got {next}");
    }

    #[test]
    fn test_heading_roundtrip() {
        let dir = Vec2::from_heading(1.0);
        assert!((dir.heading() - 1.0).abs() < 1e-5);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5);
        assert!(ease_in(0.5) < 0.5);
    }
}
