//! Scheduler configuration
//!
//! Configuration loaded from environment variables and command line.

use std::time::Duration;
use thiserror::Error;

use crate::checker::DEFAULT_BALANCE_TOLERANCE;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Anti-affinity scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Interval between passes over all regions in seconds
    pub check_interval_secs: u64,

    /// Largest score spread treated as balanced
    pub balance_tolerance: u64,

    /// Build operators but do not dispatch them
    pub dry_run: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 10,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
            dry_run: false,
        }
    }
}

impl SchedulerConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let check_interval_secs = lookup("ANTI_CHECK_INTERVAL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.check_interval_secs);

        // A zero tolerance makes every single-leader difference move back and forth
        let balance_tolerance = match lookup("ANTI_BALANCE_TOLERANCE") {
            Some(v) => match v.parse::<u64>() {
                Ok(t) if t > 0 => t,
                _ => return Err(ConfigError::InvalidValue("ANTI_BALANCE_TOLERANCE".to_string(), v)),
            },
            None => defaults.balance_tolerance,
        };

        let dry_run = lookup("ANTI_DRY_RUN")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.dry_run);

        Ok(Self {
            check_interval_secs,
            balance_tolerance,
            dry_run,
        })
    }

    /// Get check interval as Duration, never shorter than one second
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }
}
