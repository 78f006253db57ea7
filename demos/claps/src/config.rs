//! Configuration for the claps demo.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::handler::{DEFAULT_DELAY, DEFAULT_THRESHOLD};
use composable_mvi_runtime::DispatchMode;
use std::env;
use std::time::Duration;

/// Demo configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClapsConfig {
    /// Claps at which the counter stops (`CLAPS_THRESHOLD`, default 3)
    pub threshold: u32,
    /// Simulated click latency (`CLAPS_DELAY_MS`, default 500)
    pub delay: Duration,
    /// Number of scripted clicks the demo performs (`CLAPS_CLICKS`, default 8)
    pub clicks: u32,
    /// Run clicks one at a time (`CLAPS_SERIALIZED`, default false)
    pub dispatch_mode: DispatchMode,
    /// JSON state snapshot to start from (`CLAPS_RESTORE_STATE`)
    pub restore_state: Option<String>,
}

impl Default for ClapsConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            delay: DEFAULT_DELAY,
            clicks: 8,
            dispatch_mode: DispatchMode::Concurrent,
            restore_state: None,
        }
    }
}

impl ClapsConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            threshold: lookup("CLAPS_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.threshold),
            delay: lookup("CLAPS_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.delay, Duration::from_millis),
            clicks: lookup("CLAPS_CLICKS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.clicks),
            dispatch_mode: match lookup("CLAPS_SERIALIZED").as_deref() {
                Some("1" | "true" | "yes") => DispatchMode::Serialized,
                _ => defaults.dispatch_mode,
            },
            restore_state: lookup("CLAPS_RESTORE_STATE").filter(|s| !s.trim().is_empty()),
        }
    }
}
