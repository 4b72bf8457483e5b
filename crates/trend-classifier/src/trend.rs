//! Pressure tendency computation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this three-hour change (hPa) pressure is considered steady
const STEADY_THRESHOLD_HPA: f64 = 1.6;
/// At or above this three-hour change (hPa) the change is rapid
const RAPID_THRESHOLD_HPA: f64 = 6.0;

/// Standard temperature lapse rate (K/m)
const LAPSE_RATE: f64 = 0.0065;
/// Barometric formula exponent (g·M / R·L)
const BAROMETRIC_EXPONENT: f64 = 5.257;

/// Barometric tendency over a three-hour period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureTrend {
    RapidFall,
    Falling,
    Steady,
    Rising,
    RapidRise,
}

impl PressureTrend {
    /// Classify a three-hour pressure change (hPa)
    pub fn from_change(change_hpa: f64) -> Self {
        let magnitude = change_hpa.abs();
        if magnitude.is_nan() || magnitude < STEADY_THRESHOLD_HPA {
            PressureTrend::Steady
        } else if change_hpa > 0.0 {
            if magnitude >= RAPID_THRESHOLD_HPA {
                PressureTrend::RapidRise
            } else {
                PressureTrend::Rising
            }
        } else if magnitude >= RAPID_THRESHOLD_HPA {
            PressureTrend::RapidFall
        } else {
            PressureTrend::Falling
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PressureTrend::RapidFall => "rapid fall",
            PressureTrend::Falling => "falling",
            PressureTrend::Steady => "steady",
            PressureTrend::Rising => "rising",
            PressureTrend::RapidRise => "rapid rise",
        }
    }

    pub fn is_rising(&self) -> bool {
        matches!(self, PressureTrend::Rising | PressureTrend::RapidRise)
    }

    pub fn is_falling(&self) -> bool {
        matches!(self, PressureTrend::Falling | PressureTrend::RapidFall)
    }
}

impl fmt::Display for PressureTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Least-squares pressure change over the series, scaled to three hours.
///
/// Returns 0.0 for fewer than two points or when every point shares one
/// timestamp.
pub fn pressure_change_per_3h(series: &[(DateTime<Utc>, f64)]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let origin = series[0].0;
    let hours: Vec<f64> = series
        .iter()
        .map(|(ts, _)| (*ts - origin).num_seconds() as f64 / 3600.0)
        .collect();

    let n = series.len() as f64;
    let mean_x = hours.iter().sum::<f64>() / n;
    let mean_y = series.iter().map(|(_, p)| p).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (x, (_, y)) in hours.iter().zip(series) {
        let dx = x - mean_x;
        covariance += dx * (y - mean_y);
        variance += dx * dx;
    }

    if variance == 0.0 {
        return 0.0;
    }

    covariance / variance * 3.0
}

/// Reduce station pressure to mean sea level.
///
/// Uses the hypsometric approximation with the station temperature and the
/// standard lapse rate.
pub fn sea_level_pressure(station_hpa: f64, elevation_m: f64, temperature_c: f64) -> f64 {
    let lapse = LAPSE_RATE * elevation_m;
    station_hpa * (1.0 - lapse / (temperature_c + lapse + 273.15)).powf(-BAROMETRIC_EXPONENT)
}
