//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use trend_classifier::DEFAULT_MIN_SAMPLES;

/// Longest accepted horizon (one week)
pub const MAX_HORIZON_HOURS: u32 = 7 * 24;

/// Invalid engine settings
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("Station elevation {0} m is not a finite number")]
    Elevation(f64),
    #[error("horizon_hours {0} exceeds the maximum of {MAX_HORIZON_HOURS}")]
    Horizon(u32),
}

/// Configuration for the forecast engine and its scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Station elevation above sea level (m)
    pub elevation_m: f64,
    /// Standard sliding-window horizon (hours, default: 3)
    pub horizon_hours: u32,
    /// Minimum samples in a window before classifying (default: 6)
    pub min_samples: usize,
    /// Seconds between periodic forecasts (default: 3600)
    pub interval_secs: u64,
    /// Seconds to wait after startup before the first forecast (default: 10)
    pub startup_delay_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            elevation_m: 456.0,
            horizon_hours: 3,
            min_samples: DEFAULT_MIN_SAMPLES,
            interval_secs: 3600,
            startup_delay_secs: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.elevation_m.is_finite() {
            return Err(ConfigError::Elevation(self.elevation_m));
        }
        if self.horizon_hours == 0 {
            return Err(ConfigError::Zero("horizon_hours"));
        }
        if self.horizon_hours > MAX_HORIZON_HOURS {
            return Err(ConfigError::Horizon(self.horizon_hours));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::Zero("interval_secs"));
        }
        Ok(())
    }

    /// Standard horizon
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.horizon_hours))
    }

    /// Window used for classification: twice the standard horizon, so a
    /// sparse recent period still yields enough samples.
    pub fn forecast_window(&self) -> chrono::Duration {
        self.horizon() * 2
    }

    /// Scheduling period, also the staleness bound for stored forecasts
    pub fn period(&self) -> chrono::Duration {
        let secs = i64::try_from(self.interval_secs).unwrap_or(i64::MAX);
        chrono::Duration::seconds(secs.min(i64::MAX / 1000))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }
}
