//! Storage Layer
//!
//! Append-only stores for station samples and computed forecasts. Both
//! stores are exposed through the [`SampleSource`] and [`ForecastLog`]
//! traits so the forecast engine can run against SQLite in production and
//! the in-memory [`Repository`] in tests.

mod record;
mod repository;
mod sqlite;
mod validator;

pub use record::{ForecastRecord, Sample};
pub use repository::Repository;
pub use sqlite::{DatabaseConfig, SqliteRepository};
pub use validator::{SampleValidator, ValidationConfig, ValidationError};

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be reached or the query failed
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// A sample older than the newest stored sample was appended
    #[error("Sample at {attempted} is older than latest stored sample at {latest}")]
    OutOfOrder {
        latest: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },
    /// A stored row could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}

/// Read side of the station's time series.
pub trait SampleSource: Send + Sync {
    /// All samples with `timestamp >= since`, oldest first.
    fn samples_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Sample>, StorageError>> + Send;

    /// The most recent sample, if any.
    fn latest_sample(&self) -> impl Future<Output = Result<Option<Sample>, StorageError>> + Send;
}

/// Append-only log of computed forecasts.
pub trait ForecastLog: Send + Sync {
    /// Append a forecast label stamped with `created_at`.
    fn append(
        &self,
        created_at: DateTime<Utc>,
        forecast: &str,
    ) -> impl Future<Output = Result<ForecastRecord, StorageError>> + Send;

    /// The most recently appended record, if any.
    fn latest(&self) -> impl Future<Output = Result<Option<ForecastRecord>, StorageError>> + Send;

    /// Up to `limit` records, newest first.
    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ForecastRecord>, StorageError>> + Send;
}

impl<T: SampleSource> SampleSource for Arc<T> {
    fn samples_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Sample>, StorageError>> + Send {
        (**self).samples_since(since)
    }

    fn latest_sample(&self) -> impl Future<Output = Result<Option<Sample>, StorageError>> + Send {
        (**self).latest_sample()
    }
}

impl<T: ForecastLog> ForecastLog for Arc<T> {
    fn append(
        &self,
        created_at: DateTime<Utc>,
        forecast: &str,
    ) -> impl Future<Output = Result<ForecastRecord, StorageError>> + Send {
        (**self).append(created_at, forecast)
    }

    fn latest(&self) -> impl Future<Output = Result<Option<ForecastRecord>, StorageError>> + Send {
        (**self).latest()
    }

    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ForecastRecord>, StorageError>> + Send {
        (**self).recent(limit)
    }
}
