//! Runtime configuration.
//!
//! Native hosts read overrides from the environment; the browser host passes
//! a JSON object from the page. Missing fields keep their defaults either way.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_SKIP_LIMIT_MS: f64 = 200.0;
pub const DEFAULT_MIN_TIMER_MS: f64 = 1.0;
pub const DEFAULT_MAX_COMPONENT_TIMERS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on the per-frame delta, so a backgrounded tab does not
    /// produce one enormous step when it comes back.
    pub skip_limit_ms: f64,
    /// Shortest delay a timer may be created with.
    pub min_timer_ms: f64,
    /// How many timer handles a component remembers for bulk cancellation.
    pub max_component_timers: usize,
    /// Prefix prepended to every asset path.
    pub cdn: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_limit_ms: DEFAULT_SKIP_LIMIT_MS,
            min_timer_ms: DEFAULT_MIN_TIMER_MS,
            max_component_timers: DEFAULT_MAX_COMPONENT_TIMERS,
            cdn: String::new(),
        }
    }
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `FRAMEKIT_SKIP_LIMIT_MS`: default 200
    /// - `FRAMEKIT_MIN_TIMER_MS`: default 1
    /// - `FRAMEKIT_MAX_COMPONENT_TIMERS`: default 50
    /// - `FRAMEKIT_CDN`: default empty
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            skip_limit_ms: env_parse("FRAMEKIT_SKIP_LIMIT_MS", DEFAULT_SKIP_LIMIT_MS),
            min_timer_ms: env_parse("FRAMEKIT_MIN_TIMER_MS", DEFAULT_MIN_TIMER_MS),
            max_component_timers: env_parse("FRAMEKIT_MAX_COMPONENT_TIMERS", DEFAULT_MAX_COMPONENT_TIMERS),
            cdn: std::env::var("FRAMEKIT_CDN").unwrap_or_default(),
        }
    }

    /// Parse config from a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if `json` is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
