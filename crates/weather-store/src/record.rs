//! Stored record types

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Pascals per millimetre of mercury
const PA_PER_MMHG: f64 = 133.322;

/// A single station reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Reading time, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
    /// Station-level pressure (hPa), not reduced to sea level
    pub pressure_hpa: f64,
    /// Outdoor temperature (°C)
    pub temperature_c: f64,
    /// Indoor temperature (°C), when the station reports one
    pub indoor_temperature_c: Option<f64>,
}

impl Sample {
    /// Create a sample without an indoor reading
    pub fn new(timestamp: DateTime<Utc>, pressure_hpa: f64, temperature_c: f64) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            pressure_hpa,
            temperature_c,
            indoor_temperature_c: None,
        }
    }

    /// Attach an indoor temperature reading
    pub fn with_indoor(mut self, indoor_temperature_c: f64) -> Self {
        self.indoor_temperature_c = Some(indoor_temperature_c);
        self
    }

    /// Station pressure in millimetres of mercury
    pub fn pressure_mmhg(&self) -> f64 {
        self.pressure_hpa * 100.0 / PA_PER_MMHG
    }
}

/// A persisted forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub forecast: String,
}

impl ForecastRecord {
    /// Whether this record is older than one scheduling period at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, period: Duration) -> bool {
        now - self.created_at > period
    }
}
