//! Scalar helpers shared by tweens, loaders and host code.

#[cfg(test)]
#[path = "math_test.rs"]
mod math_test;

/// Clamp `value` between two bounds given in either order.
#[must_use]
pub fn clamp(value: f64, a: f64, b: f64) -> f64 {
    value.max(a.min(b)).min(a.max(b))
}

/// Remap `value` from `[old_min, old_max]` to `[new_min, new_max]`,
/// optionally clamping to the new range. A degenerate old range maps to
/// `new_min`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn range(value: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64, clamped: bool) -> f64 {
    if old_max == old_min {
        return new_min;
    }
    let out = mix(new_min, new_max, (value - old_min) / (old_max - old_min));
    if clamped { clamp(out, new_min, new_max) } else { out }
}

/// Linear interpolation. Exact at both ends.
#[must_use]
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// `0` below `edge`, `1` at or above it.
#[must_use]
pub fn step(edge: f64, value: f64) -> f64 {
    if value < edge { 0.0 } else { 1.0 }
}

/// Hermite interpolation between `min` and `max`.
#[must_use]
pub fn smooth_step(min: f64, max: f64, value: f64) -> f64 {
    let t = clamp((value - min) / (max - min), 0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fractional part, always in `[0, 1)` for finite input.
#[must_use]
pub fn fract(value: f64) -> f64 {
    value - value.floor()
}

/// Modulo with the sign of `n`, so negative inputs wrap around.
#[must_use]
pub fn modulo(m: f64, n: f64) -> f64 {
    ((m % n) + n) % n
}
