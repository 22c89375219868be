//! Easing curves, the CSS ease table, and CSS transform strings.
//!
//! Curves are the usual Penner set: `Linear` plus ten families, each with
//! `In`, `Out` and `InOut` variants. Names follow the `easeInOutCubic`
//! convention; any name that does not parse selects `Cubic` / `Out`, so a
//! misspelled or missing ease still animates.

#[cfg(test)]
#[path = "interpolation_test.rs"]
mod interpolation_test;

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use crate::tween::TweenTarget;

const BACK_OVERSHOOT: f64 = 1.701_58;
const BACK_INOUT_SCALE: f64 = 1.525;

/// Default elastic amplitude.
pub const ELASTIC_AMPLITUDE: f64 = 1.0;
/// Default elastic period.
pub const ELASTIC_PERIOD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Linear,
    Quad,
    Cubic,
    Quart,
    Quint,
    Sine,
    Expo,
    Circ,
    Elastic,
    Back,
    Bounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    In,
    Out,
    InOut,
}

/// A named easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Curve {
    pub family: Family,
    pub mode: Mode,
}

impl Default for Curve {
    fn default() -> Self {
        Self { family: Family::Cubic, mode: Mode::Out }
    }
}

impl Curve {
    pub const LINEAR: Self = Self { family: Family::Linear, mode: Mode::In };

    #[must_use]
    pub fn new(family: Family, mode: Mode) -> Self {
        Self { family, mode }
    }

    /// Resolve an ease name such as `"easeInOutQuad"` or `"linear"`.
    /// Unknown names resolve to the default `Cubic` / `Out`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(name, "unknown ease name; using easeOutCubic");
            Self::default()
        })
    }

    fn parse(name: &str) -> Option<Self> {
        if name == "linear" {
            return Some(Self::LINEAR);
        }
        let (mode, rest) = if let Some(rest) = name.strip_prefix("easeInOut") {
            (Mode::InOut, rest)
        } else if let Some(rest) = name.strip_prefix("easeIn") {
            (Mode::In, rest)
        } else if let Some(rest) = name.strip_prefix("easeOut") {
            (Mode::Out, rest)
        } else {
            return None;
        };
        let family = match rest {
            "Quad" => Family::Quad,
            "Cubic" => Family::Cubic,
            "Quart" => Family::Quart,
            "Quint" => Family::Quint,
            "Sine" => Family::Sine,
            "Expo" => Family::Expo,
            "Circ" => Family::Circ,
            "Elastic" => Family::Elastic,
            "Back" => Family::Back,
            "Bounce" => Family::Bounce,
            _ => return None,
        };
        Some(Self { family, mode })
    }

    /// Evaluate at `k` in `[0, 1]` with default elastic parameters.
    #[must_use]
    pub fn apply(self, k: f64) -> f64 {
        self.apply_with(k, ELASTIC_AMPLITUDE, ELASTIC_PERIOD)
    }

    /// Evaluate at `k`; `amplitude` and `period` only affect `Elastic`.
    #[must_use]
    pub fn apply_with(self, k: f64, amplitude: f64, period: f64) -> f64 {
        match self.family {
            Family::Linear => k,
            Family::Quad => polynomial(self.mode, k, 2),
            Family::Cubic => polynomial(self.mode, k, 3),
            Family::Quart => polynomial(self.mode, k, 4),
            Family::Quint => polynomial(self.mode, k, 5),
            Family::Sine => sine(self.mode, k),
            Family::Expo => expo(self.mode, k),
            Family::Circ => circ(self.mode, k),
            Family::Elastic => elastic(self.mode, k, amplitude, period),
            Family::Back => back(self.mode, k),
            Family::Bounce => bounce(self.mode, k),
        }
    }
}

/// `k^n` family: quad, cubic, quart, quint.
fn polynomial(mode: Mode, k: f64, n: i32) -> f64 {
    match mode {
        Mode::In => k.powi(n),
        Mode::Out => 1.0 - (1.0 - k).powi(n),
        Mode::InOut => {
            if k < 0.5 {
                0.5 * (2.0 * k).powi(n)
            } else {
                1.0 - 0.5 * (2.0 - 2.0 * k).powi(n)
            }
        }
    }
}

fn sine(mode: Mode, k: f64) -> f64 {
    match mode {
        Mode::In => 1.0 - (k * PI / 2.0).cos(),
        Mode::Out => (k * PI / 2.0).sin(),
        Mode::InOut => 0.5 * (1.0 - (PI * k).cos()),
    }
}

#[allow(clippy::float_cmp)]
fn expo(mode: Mode, k: f64) -> f64 {
    match mode {
        Mode::In => {
            if k == 0.0 { 0.0 } else { 1024_f64.powf(k - 1.0) }
        }
        Mode::Out => {
            if k == 1.0 { 1.0 } else { 1.0 - 2_f64.powf(-10.0 * k) }
        }
        Mode::InOut => {
            if k == 0.0 || k == 1.0 {
                return k;
            }
            let k = k * 2.0;
            if k < 1.0 {
                0.5 * 1024_f64.powf(k - 1.0)
            } else {
                0.5 * (2.0 - 2_f64.powf(-10.0 * (k - 1.0)))
            }
        }
    }
}

fn circ(mode: Mode, k: f64) -> f64 {
    match mode {
        Mode::In => 1.0 - (1.0 - k * k).sqrt(),
        Mode::Out => {
            let k = k - 1.0;
            (1.0 - k * k).sqrt()
        }
        Mode::InOut => {
            let k = k * 2.0;
            if k < 1.0 {
                -0.5 * ((1.0 - k * k).sqrt() - 1.0)
            } else {
                let k = k - 2.0;
                0.5 * ((1.0 - k * k).sqrt() + 1.0)
            }
        }
    }
}

#[allow(clippy::float_cmp)]
fn elastic(mode: Mode, k: f64, amplitude: f64, period: f64) -> f64 {
    if k == 0.0 || k == 1.0 {
        return k;
    }
    let (a, s) = if amplitude < 1.0 || amplitude.is_nan() {
        (1.0, period / 4.0)
    } else {
        (amplitude, period * (1.0 / amplitude).asin() / (2.0 * PI))
    };
    let wave = |k: f64| ((k - s) * (2.0 * PI) / period).sin();
    match mode {
        Mode::In => {
            let k = k - 1.0;
            -(a * 2_f64.powf(10.0 * k) * wave(k))
        }
        Mode::Out => a * 2_f64.powf(-10.0 * k) * wave(k) + 1.0,
        Mode::InOut => {
            let k = k * 2.0 - 1.0;
            if k < 0.0 {
                -0.5 * (a * 2_f64.powf(10.0 * k) * wave(k))
            } else {
                a * 2_f64.powf(-10.0 * k) * wave(k) * 0.5 + 1.0
            }
        }
    }
}

fn back(mode: Mode, k: f64) -> f64 {
    match mode {
        Mode::In => {
            let s = BACK_OVERSHOOT;
            k * k * ((s + 1.0) * k - s)
        }
        Mode::Out => {
            let s = BACK_OVERSHOOT;
            let k = k - 1.0;
            k * k * ((s + 1.0) * k + s) + 1.0
        }
        Mode::InOut => {
            let s = BACK_OVERSHOOT * BACK_INOUT_SCALE;
            let k = k * 2.0;
            if k < 1.0 {
                0.5 * (k * k * ((s + 1.0) * k - s))
            } else {
                let k = k - 2.0;
                0.5 * (k * k * ((s + 1.0) * k + s) + 2.0)
            }
        }
    }
}

fn bounce_out(k: f64) -> f64 {
    if k < 1.0 / 2.75 {
        7.5625 * k * k
    } else if k < 2.0 / 2.75 {
        let k = k - 1.5 / 2.75;
        7.5625 * k * k + 0.75
    } else if k < 2.5 / 2.75 {
        let k = k - 2.25 / 2.75;
        7.5625 * k * k + 0.9375
    } else {
        let k = k - 2.625 / 2.75;
        7.5625 * k * k + 0.984_375
    }
}

fn bounce(mode: Mode, k: f64) -> f64 {
    match mode {
        Mode::In => 1.0 - bounce_out(1.0 - k),
        Mode::Out => bounce_out(k),
        Mode::InOut => {
            if k < 0.5 {
                (1.0 - bounce_out(1.0 - k * 2.0)) * 0.5
            } else {
                bounce_out(k * 2.0 - 1.0) * 0.5 + 0.5
            }
        }
    }
}

/// How a tween maps linear progress to an interpolation factor.
#[derive(Clone)]
pub enum Ease {
    Named(Curve),
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Ease {
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    #[must_use]
    pub fn apply_with(&self, k: f64, amplitude: f64, period: f64) -> f64 {
        match self {
            Self::Named(curve) => curve.apply_with(k, amplitude, period),
            Self::Custom(f) => f(k),
        }
    }
}

impl Default for Ease {
    fn default() -> Self {
        Self::Named(Curve::default())
    }
}

impl From<Curve> for Ease {
    fn from(curve: Curve) -> Self {
        Self::Named(curve)
    }
}

impl From<&str> for Ease {
    fn from(name: &str) -> Self {
        Self::Named(Curve::from_name(name))
    }
}

impl fmt::Debug for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(curve) => f.debug_tuple("Named").field(curve).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ── CSS ───────────────────────────────────────────────────────────

const CSS_EASES: &[(&str, &str)] = &[
    ("easeOutCubic", "cubic-bezier(0.215, 0.610, 0.355, 1.000)"),
    ("easeOutQuad", "cubic-bezier(0.250, 0.460, 0.450, 0.940)"),
    ("easeOutQuart", "cubic-bezier(0.165, 0.840, 0.440, 1.000)"),
    ("easeOutQuint", "cubic-bezier(0.230, 1.000, 0.320, 1.000)"),
    ("easeOutSine", "cubic-bezier(0.390, 0.575, 0.565, 1.000)"),
    ("easeOutExpo", "cubic-bezier(0.190, 1.000, 0.220, 1.000)"),
    ("easeOutCirc", "cubic-bezier(0.075, 0.820, 0.165, 1.000)"),
    ("easeOutBack", "cubic-bezier(0.175, 0.885, 0.320, 1.275)"),
    ("easeInCubic", "cubic-bezier(0.550, 0.055, 0.675, 0.190)"),
    ("easeInQuad", "cubic-bezier(0.550, 0.085, 0.680, 0.530)"),
    ("easeInQuart", "cubic-bezier(0.895, 0.030, 0.685, 0.220)"),
    ("easeInQuint", "cubic-bezier(0.755, 0.050, 0.855, 0.060)"),
    ("easeInSine", "cubic-bezier(0.470, 0.000, 0.745, 0.715)"),
    ("easeInCirc", "cubic-bezier(0.600, 0.040, 0.980, 0.335)"),
    ("easeInBack", "cubic-bezier(0.600, -0.280, 0.735, 0.045)"),
    ("easeInOutCubic", "cubic-bezier(0.645, 0.045, 0.355, 1.000)"),
    ("easeInOutQuad", "cubic-bezier(0.455, 0.030, 0.515, 0.955)"),
    ("easeInOutQuart", "cubic-bezier(0.770, 0.000, 0.175, 1.000)"),
    ("easeInOutQuint", "cubic-bezier(0.860, 0.000, 0.070, 1.000)"),
    ("easeInOutSine", "cubic-bezier(0.445, 0.050, 0.550, 0.950)"),
    ("easeInOutExpo", "cubic-bezier(1.000, 0.000, 0.000, 1.000)"),
    ("easeInOutCirc", "cubic-bezier(0.785, 0.135, 0.150, 0.860)"),
    ("easeInOutBack", "cubic-bezier(0.680, -0.550, 0.265, 1.550)"),
    ("easeInOut", "cubic-bezier(0.420, 0.000, 0.580, 1.000)"),
    ("linear", "linear"),
];

/// CSS `transition-timing-function` for an ease name, `easeOutCubic` if unknown.
#[must_use]
pub fn css_ease(name: &str) -> &'static str {
    CSS_EASES
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(CSS_EASES[0].1, |(_, bezier)| bezier)
}

/// Properties rendered through the CSS `transform` property.
pub const TRANSFORMS: &[&str] = &[
    "x",
    "y",
    "z",
    "scale",
    "scaleX",
    "scaleY",
    "rotation",
    "rotationX",
    "rotationY",
    "rotationZ",
    "skewX",
    "skewY",
    "perspective",
];

#[must_use]
pub fn is_transform(key: &str) -> bool {
    TRANSFORMS.contains(&key)
}

/// Collect the non-zero transform properties of `target`.
pub fn all_transforms(target: &impl TweenTarget) -> BTreeMap<String, f64> {
    TRANSFORMS
        .iter()
        .filter_map(|key| target.get(key).filter(|v| *v != 0.0).map(|v| ((*key).to_owned(), v)))
        .collect()
}

/// Build a CSS `transform` value from transform properties.
///
/// Translation is emitted as one `translate3d` when any of `x`/`y`/`z` is
/// present; `scale` wins over `scaleX`/`scaleY`.
#[must_use]
pub fn parse_transform(props: &BTreeMap<String, f64>) -> String {
    let get = |key: &str| props.get(key).copied();
    let mut parts = Vec::new();
    if get("x").is_some() || get("y").is_some() || get("z").is_some() {
        let (x, y, z) = (get("x").unwrap_or(0.0), get("y").unwrap_or(0.0), get("z").unwrap_or(0.0));
        parts.push(format!("translate3d({x}px, {y}px, {z}px)"));
    }
    if let Some(scale) = get("scale") {
        parts.push(format!("scale({scale})"));
    } else {
        for key in ["scaleX", "scaleY"] {
            if let Some(v) = get(key) {
                parts.push(format!("{key}({v})"));
            }
        }
    }
    for (key, func) in [
        ("rotation", "rotate"),
        ("rotationX", "rotateX"),
        ("rotationY", "rotateY"),
        ("rotationZ", "rotateZ"),
        ("skewX", "skewX"),
        ("skewY", "skewY"),
    ] {
        if let Some(v) = get(key) {
            parts.push(format!("{func}({v}deg)"));
        }
    }
    if let Some(v) = get("perspective") {
        parts.push(format!("perspective({v}px)"));
    }
    parts.concat()
}
