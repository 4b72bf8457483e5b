//! Range checks for incoming station samples

use crate::Sample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a reading is not physically plausible
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite value
    #[error("{0} is not a finite number")]
    NotFinite(&'static str),
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Station pressure valid range (hPa)
    pub pressure_range: (f64, f64),
    /// Temperature valid range (°C), applied to both thermometers
    pub temperature_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            pressure_range: (300.0, 1100.0),
            temperature_range: (-90.0, 60.0),
        }
    }
}

/// Validator for samples arriving from the station
#[derive(Debug, Clone, Default)]
pub struct SampleValidator {
    config: ValidationConfig,
}

impl SampleValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    fn validate_range(
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite(field));
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Check every reading in a sample
    pub fn validate(&self, sample: &Sample) -> Result<(), ValidationError> {
        Self::validate_range("pressure_hpa", sample.pressure_hpa, self.config.pressure_range)?;
        Self::validate_range("outdoor", sample.temperature_c, self.config.temperature_range)?;
        if let Some(indoor) = sample.indoor_temperature_c {
            Self::validate_range("indoor", indoor, self.config.temperature_range)?;
        }
        Ok(())
    }
}
