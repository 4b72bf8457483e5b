//! SQLite-backed stores

use crate::{ForecastLog, ForecastRecord, Sample, SampleSource, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS weather_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at INTEGER NOT NULL,
        outdoor_temp REAL NOT NULL,
        indoor_temp REAL,
        pressure_hpa REAL NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_weather_data_created_at ON weather_data (created_at)",
    "CREATE TABLE IF NOT EXISTS weather_forecast (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at INTEGER NOT NULL,
        forecast TEXT NOT NULL
    )",
];

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://weather.db` or `sqlite::memory:`
    pub url: String,
    /// Pool size for file databases
    pub max_connections: u32,
    /// How long a query waits for a pooled connection (seconds)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://weather.db".to_string(),
            max_connections: 4,
            acquire_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Config for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Sample and forecast store on a SQLite pool.
///
/// Cloning is cheap and shares the pool.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if needed) the database and apply the schema
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let mut options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

        // An in-memory database lives exactly as long as its connection.
        if config.is_in_memory() {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.max_connections(config.max_connections);
        }

        let pool = pool_options.connect_with(options).await?;
        let repo = Self { pool };
        repo.migrate().await?;

        info!("Opened SQLite repository at {}", config.url);
        Ok(repo)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Append a station sample
    pub async fn insert_sample(&self, sample: &Sample) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO weather_data (created_at, outdoor_temp, indoor_temp, pressure_hpa)
             VALUES (?, ?, ?, ?)",
        )
        .bind(sample.timestamp.timestamp())
        .bind(sample.temperature_c)
        .bind(sample.indoor_temperature_c)
        .bind(sample.pressure_hpa)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted sample with ID {}", id);
        Ok(id)
    }

    /// Close the pool, waiting for in-flight queries
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn timestamp_from_secs(secs: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StorageError::Corrupt(format!("timestamp {} out of range", secs)))
}

fn sample_from_row(row: &SqliteRow) -> Result<Sample, StorageError> {
    Ok(Sample {
        timestamp: timestamp_from_secs(row.try_get("created_at")?)?,
        pressure_hpa: row.try_get("pressure_hpa")?,
        temperature_c: row.try_get("outdoor_temp")?,
        indoor_temperature_c: row.try_get("indoor_temp")?,
    })
}

/// Rows hold whole seconds, so a fractional lower bound rounds up.
fn window_start_secs(since: DateTime<Utc>) -> i64 {
    since.timestamp() + i64::from(since.timestamp_subsec_nanos() > 0)
}

fn forecast_from_row(row: &SqliteRow) -> Result<ForecastRecord, StorageError> {
    Ok(ForecastRecord {
        id: row.try_get("id")?,
        created_at: timestamp_from_secs(row.try_get("created_at")?)?,
        forecast: row.try_get("forecast")?,
    })
}

impl SampleSource for SqliteRepository {
    async fn samples_since(&self, since: DateTime<Utc>) -> Result<Vec<Sample>, StorageError> {
        let rows = sqlx::query(
            "SELECT created_at, pressure_hpa, outdoor_temp, indoor_temp
             FROM weather_data
             WHERE created_at >= ?
             ORDER BY created_at, id",
        )
        .bind(window_start_secs(since))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(sample_from_row).collect()
    }

    async fn latest_sample(&self) -> Result<Option<Sample>, StorageError> {
        let row = sqlx::query(
            "SELECT created_at, pressure_hpa, outdoor_temp, indoor_temp
             FROM weather_data
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(sample_from_row).transpose()
    }
}

impl ForecastLog for SqliteRepository {
    async fn append(
        &self,
        created_at: DateTime<Utc>,
        forecast: &str,
    ) -> Result<ForecastRecord, StorageError> {
        let result = sqlx::query("INSERT INTO weather_forecast (created_at, forecast) VALUES (?, ?)")
            .bind(created_at.timestamp())
            .bind(forecast)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted forecast with ID {}", id);

        Ok(ForecastRecord {
            id,
            created_at: timestamp_from_secs(created_at.timestamp())?,
            forecast: forecast.to_string(),
        })
    }

    async fn latest(&self) -> Result<Option<ForecastRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT id, created_at, forecast FROM weather_forecast ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(forecast_from_row).transpose()
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ForecastRecord>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, created_at, forecast FROM weather_forecast ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(forecast_from_row).collect()
    }
}
