//! Window classification

use crate::trend::PressureTrend;
use crate::zambretti::Zambretti;
use crate::ClassifyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use weather_store::Sample;

/// Minimum samples in a window before a forecast is attempted
pub const DEFAULT_MIN_SAMPLES: usize = 6;

/// Output of a forecasting algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Categorical label from the algorithm's vocabulary
    pub label: String,
    /// Tendency the label was derived from
    pub trend: PressureTrend,
    /// Pressure change normalised to three hours (hPa)
    pub pressure_change_hpa: f64,
}

/// A forecasting rule set over a station pressure series.
///
/// Implementations must be pure: no I/O, and the same inputs always give
/// the same forecast.
pub trait PressureForecaster: Send + Sync {
    /// `series` is ordered ascending by time and holds raw station
    /// pressure (hPa).
    fn forecast(
        &self,
        series: &[(DateTime<Utc>, f64)],
        elevation_m: f64,
        temperature_c: f64,
    ) -> Forecast;
}

/// Classifier enforcing the minimum-sample policy before delegating to a
/// forecasting algorithm
#[derive(Debug, Clone)]
pub struct TrendClassifier<A = Zambretti> {
    min_samples: usize,
    algorithm: A,
}

impl TrendClassifier<Zambretti> {
    /// Create a Zambretti classifier
    pub fn new(min_samples: usize) -> Self {
        Self::with_algorithm(min_samples, Zambretti)
    }
}

impl Default for TrendClassifier<Zambretti> {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SAMPLES)
    }
}

impl<A: PressureForecaster> TrendClassifier<A> {
    /// Create a classifier around a custom algorithm
    pub fn with_algorithm(min_samples: usize, algorithm: A) -> Self {
        Self {
            min_samples,
            algorithm,
        }
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Classify an ascending window of samples.
    pub fn classify(
        &self,
        window: &[Sample],
        temperature_c: f64,
        elevation_m: f64,
    ) -> Result<Forecast, ClassifyError> {
        if window.len() < self.min_samples {
            return Err(ClassifyError::InsufficientData {
                required: self.min_samples,
                available: window.len(),
            });
        }

        let series: Vec<(DateTime<Utc>, f64)> = window
            .iter()
            .map(|s| (s.timestamp, s.pressure_hpa))
            .collect();

        let forecast = self.algorithm.forecast(&series, elevation_m, temperature_c);
        debug!(
            "Classified {} samples: change {:+.2} hPa/3h -> {}",
            window.len(),
            forecast.pressure_change_hpa,
            forecast.label
        );

        Ok(forecast)
    }
}
