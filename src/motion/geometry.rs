//! Planar geometry for field poses.
//!
//! Units are metres and radians, field frame: +x away from the driver
//! station, +y to the left, heading counter-clockwise from +x.

use core::f64::consts::PI;

/// A 2D point (or displacement) on the field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Translation2d {
    pub x: f64,
    pub y: f64,
}

impl Translation2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Translation2d) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation; `t` = 0 yields `self`, 1 yields `other`.
    pub fn lerp(&self, other: Translation2d, t: f64) -> Translation2d {
        Translation2d::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Position plus heading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose2d {
    pub translation: Translation2d,
    /// Heading in radians.
    pub rotation: f64,
}

impl Pose2d {
    pub const fn new(x: f64, y: f64, rotation: f64) -> Self {
        Self {
            translation: Translation2d::new(x, y),
            rotation,
        }
    }

    pub fn x(&self) -> f64 {
        self.translation.x
    }

    pub fn y(&self) -> f64 {
        self.translation.y
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite()
    }
}

/// Wrap an angle into (-π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Interpolate between two headings along the shorter arc.
pub fn lerp_angle(from: f64, to: f64, t: f64) -> f64 {
    wrap_angle(from + wrap_angle(to - from) * t)
}
