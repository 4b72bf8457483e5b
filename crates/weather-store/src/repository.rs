//! In-memory Repository Implementation

use crate::{ForecastLog, ForecastRecord, Sample, SampleSource, StorageError};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// In-memory store for samples and forecasts.
///
/// Samples are kept sorted by timestamp so window lookups are a binary
/// search; forecast ids come from a monotonic counter so the latest
/// record is always the last one.
pub struct Repository {
    /// Sample log, ascending by timestamp
    samples: Mutex<Vec<Sample>>,
    /// Forecast log, ascending by id
    forecasts: Mutex<Vec<ForecastRecord>>,
}

impl Repository {
    /// Create an empty in-memory repository
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            samples: Mutex::new(Vec::with_capacity(1024)),
            forecasts: Mutex::new(Vec::with_capacity(256)),
        }
    }

    /// Append a sample. Samples must arrive in timestamp order.
    pub fn insert_sample(&self, sample: Sample) -> Result<(), StorageError> {
        let mut samples = lock(&self.samples)?;

        if let Some(last) = samples.last() {
            if sample.timestamp < last.timestamp {
                return Err(StorageError::OutOfOrder {
                    latest: last.timestamp,
                    attempted: sample.timestamp,
                });
            }
        }

        samples.push(sample);
        Ok(())
    }

    /// Get total sample count
    pub fn sample_count(&self) -> usize {
        self.samples.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Get total forecast count
    pub fn forecast_count(&self) -> usize {
        self.forecasts.lock().map(|f| f.len()).unwrap_or(0)
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))
}

impl SampleSource for Repository {
    async fn samples_since(&self, since: DateTime<Utc>) -> Result<Vec<Sample>, StorageError> {
        let samples = lock(&self.samples)?;
        let start = samples.partition_point(|s| s.timestamp < since);
        Ok(samples[start..].to_vec())
    }

    async fn latest_sample(&self) -> Result<Option<Sample>, StorageError> {
        Ok(lock(&self.samples)?.last().cloned())
    }
}

impl ForecastLog for Repository {
    async fn append(
        &self,
        created_at: DateTime<Utc>,
        forecast: &str,
    ) -> Result<ForecastRecord, StorageError> {
        let mut forecasts = lock(&self.forecasts)?;

        let id = forecasts.last().map_or(1, |r| r.id + 1);
        let record = ForecastRecord {
            id,
            created_at,
            forecast: forecast.to_string(),
        };
        forecasts.push(record.clone());
        debug!("Inserted forecast with ID {}", id);

        Ok(record)
    }

    async fn latest(&self) -> Result<Option<ForecastRecord>, StorageError> {
        Ok(lock(&self.forecasts)?.last().cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ForecastRecord>, StorageError> {
        Ok(lock(&self.forecasts)?
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}
