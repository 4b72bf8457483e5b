//! Pressure Trend Classification
//!
//! Turns an ordered window of station samples into a categorical weather
//! forecast. The window checks live in [`TrendClassifier`]; the rule table
//! is behind [`PressureForecaster`] so it can be swapped out.

mod classifier;
mod trend;
mod zambretti;

pub use classifier::{Forecast, PressureForecaster, TrendClassifier, DEFAULT_MIN_SAMPLES};
pub use trend::{pressure_change_per_3h, sea_level_pressure, PressureTrend};
pub use zambretti::{Outlook, Zambretti};

use thiserror::Error;

/// Classification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The window holds fewer samples than the configured minimum
    #[error("Insufficient data: need at least {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },
}
