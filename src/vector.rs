//! Plain 2D and 3D vectors.
//!
//! Both are `Copy` values and implement [`TweenTarget`] over their
//! components, so a shared `Rc<RefCell<Vector2>>` can be tweened directly.

#[cfg(test)]
#[path = "vector_test.rs"]
mod vector_test;

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use crate::interpolation::Curve;
use crate::math;
use crate::tween::TweenTarget;

/// Floor for squared lengths, so normalizing a zero vector stays finite.
const MIN_LENGTH_SQ: f64 = 0.000_01;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `angle` radians, `radius` away from the origin.
    #[must_use]
    pub fn from_angle_radius(angle: f64, radius: f64) -> Self {
        Self { x: angle.cos() * radius, y: angle.sin() * radius }
    }

    #[must_use]
    pub fn length_sq(self) -> f64 {
        let sq = self.x * self.x + self.y * self.y;
        if sq == 0.0 { MIN_LENGTH_SQ } else { sq }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        self / self.length()
    }

    #[must_use]
    pub fn with_length(self, length: f64) -> Self {
        self.normalize() * length
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Rotated a quarter turn counter-clockwise.
    #[must_use]
    pub fn perpendicular(self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    #[must_use]
    pub fn lerp(self, target: Self, alpha: f64) -> Self {
        Self { x: math::mix(self.x, target.x, alpha), y: math::mix(self.y, target.y, alpha) }
    }

    /// `lerp` applied `frames` times, for frame-count independent smoothing.
    #[must_use]
    pub fn delta_lerp(self, target: Self, alpha: f64, frames: u32) -> Self {
        (0..frames).fold(self, |v, _| v.lerp(target, alpha))
    }

    /// Distance-weighted lerp: the closer `target` is, the larger the step,
    /// shaped by `curve`. Beyond `dist` the step is zero.
    #[must_use]
    pub fn interp(self, target: Self, alpha: f64, curve: Curve, dist: f64) -> Self {
        let closeness = math::range((self - target).length_sq(), 0.0, dist * dist, 1.0, 0.0, true);
        self.lerp(target, curve.apply(closeness * (alpha / 10.0)))
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.distance_sq_to(other).sqrt()
    }

    #[must_use]
    pub fn distance_sq_to(self, other: Self) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        dx * dx + dy * dy
    }

    /// Angle in radians of the direction from `self` to `other`.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl TweenTarget for Vector2 {
    fn get(&self, prop: &str) -> Option<f64> {
        match prop {
            "x" => Some(self.x),
            "y" => Some(self.y),
            _ => None,
        }
    }

    fn set(&mut self, prop: &str, value: f64) {
        match prop {
            "x" => self.x = value,
            "y" => self.y = value,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length_sq(self) -> f64 {
        let sq = self.dot(self);
        if sq == 0.0 { MIN_LENGTH_SQ } else { sq }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        self / self.length()
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    #[must_use]
    pub fn lerp(self, target: Self, alpha: f64) -> Self {
        Self {
            x: math::mix(self.x, target.x, alpha),
            y: math::mix(self.y, target.y, alpha),
            z: math::mix(self.z, target.z, alpha),
        }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        let d = self - other;
        d.dot(d).sqrt()
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self { x: self.x / rhs, y: self.y / rhs, z: self.z / rhs }
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

impl TweenTarget for Vector3 {
    fn get(&self, prop: &str) -> Option<f64> {
        match prop {
            "x" => Some(self.x),
            "y" => Some(self.y),
            "z" => Some(self.z),
            _ => None,
        }
    }

    fn set(&mut self, prop: &str, value: f64) {
        match prop {
            "x" => self.x = value,
            "y" => self.y = value,
            "z" => self.z = value,
            _ => {}
        }
    }
}
