//! Forecast Engine Implementation

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use trend_classifier::{
    ClassifyError, PressureForecaster, PressureTrend, TrendClassifier, Zambretti,
};
use weather_store::{ForecastLog, ForecastRecord, Sample, SampleSource, StorageError};

/// Errors from a forecast computation
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few samples in the forecast window; expected while the station
    /// is starting up or has been offline
    #[error("Not enough data for a forecast: need at least {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },
    /// A store could not be reached
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ForecastError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ForecastError::InsufficientData { .. })
    }
}

impl From<ClassifyError> for ForecastError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::InsufficientData {
                required,
                available,
            } => ForecastError::InsufficientData {
                required,
                available,
            },
        }
    }
}

/// A freshly computed forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Forecast label
    pub label: String,
    /// Pressure tendency behind the label
    pub trend: PressureTrend,
    /// Pressure change normalised to three hours (hPa)
    pub pressure_change_hpa: f64,
    /// Outdoor temperature fed to the classifier (°C)
    pub temperature_c: f64,
    /// Samples in the classified window
    pub sample_count: usize,
    /// When the forecast was computed
    pub evaluated_at: DateTime<Utc>,
}

/// Pressure-trend forecast engine over a sample source and a forecast log
#[derive(Debug)]
pub struct ForecastEngine<S, F, A = Zambretti> {
    config: EngineConfig,
    samples: S,
    forecasts: F,
    classifier: TrendClassifier<A>,
    clock: Arc<dyn Clock>,
}

impl<S: SampleSource, F: ForecastLog> ForecastEngine<S, F> {
    /// Create an engine using the Zambretti classifier and the system clock
    pub fn new(config: EngineConfig, samples: S, forecasts: F) -> Self {
        let classifier = TrendClassifier::new(config.min_samples);
        Self::with_classifier(config, samples, forecasts, classifier)
    }
}

impl<S, F, A> ForecastEngine<S, F, A>
where
    S: SampleSource,
    F: ForecastLog,
    A: PressureForecaster,
{
    /// Create an engine around a custom classifier
    pub fn with_classifier(
        config: EngineConfig,
        samples: S,
        forecasts: F,
        classifier: TrendClassifier<A>,
    ) -> Self {
        info!(
            "Forecast engine created: elevation {} m, horizon {} h, min {} samples",
            config.elevation_m, config.horizon_hours, classifier.min_samples()
        );
        Self {
            config,
            samples,
            forecasts,
            classifier,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_source(&self) -> &S {
        &self.samples
    }

    pub fn forecast_log(&self) -> &F {
        &self.forecasts
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Samples from the last `horizon`, oldest first. Empty is not an error.
    pub async fn select_window(&self, horizon: Duration) -> Result<Vec<Sample>, StorageError> {
        self.select_window_at(self.clock.now(), horizon).await
    }

    /// Samples with `timestamp >= now - horizon`, oldest first. A horizon
    /// reaching past the representable range selects everything.
    pub async fn select_window_at(
        &self,
        now: DateTime<Utc>,
        horizon: Duration,
    ) -> Result<Vec<Sample>, StorageError> {
        let since = now
            .checked_sub_signed(horizon)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.samples.samples_since(since).await
    }

    /// Most recently persisted forecast
    pub async fn latest_forecast(&self) -> Result<Option<ForecastRecord>, StorageError> {
        self.forecasts.latest().await
    }

    /// Up to `limit` persisted forecasts, newest first
    pub async fn recent_forecasts(&self, limit: usize) -> Result<Vec<ForecastRecord>, StorageError> {
        self.forecasts.recent(limit).await
    }

    /// Most recent station sample
    pub async fn current_conditions(&self) -> Result<Option<Sample>, StorageError> {
        self.samples.latest_sample().await
    }

    /// Pressure history for charting; no classification
    pub async fn pressure_series(&self, horizon: Duration) -> Result<Vec<Sample>, StorageError> {
        self.select_window(horizon).await
    }

    /// Whether a persisted forecast is older than one scheduling period
    pub fn is_stale(&self, record: &ForecastRecord) -> bool {
        record.is_stale(self.clock.now(), self.config.period())
    }

    /// Classify a window using its newest sample's outdoor temperature.
    ///
    /// This is the only classification routine; the periodic and
    /// on-demand paths both go through it.
    pub fn forecast_from_window(
        &self,
        window: &[Sample],
        evaluated_at: DateTime<Utc>,
    ) -> Result<ForecastResult, ForecastError> {
        let Some(newest) = window.last() else {
            return Err(ForecastError::InsufficientData {
                required: self.classifier.min_samples().max(1),
                available: 0,
            });
        };

        let temperature_c = newest.temperature_c;
        let forecast =
            self.classifier
                .classify(window, temperature_c, self.config.elevation_m)?;

        Ok(ForecastResult {
            label: forecast.label,
            trend: forecast.trend,
            pressure_change_hpa: forecast.pressure_change_hpa,
            temperature_c,
            sample_count: window.len(),
            evaluated_at,
        })
    }

    async fn evaluate(&self) -> Result<ForecastResult, ForecastError> {
        let evaluated_at = self.clock.now();
        let window = self
            .select_window_at(evaluated_at, self.config.forecast_window())
            .await?;
        debug!("Selected {} samples for forecast", window.len());
        self.forecast_from_window(&window, evaluated_at)
    }

    /// On-demand forecast. Never persisted, so [`Self::latest_forecast`]
    /// keeps reporting the last scheduled result.
    pub async fn compute_forecast_now(&self) -> Result<ForecastResult, ForecastError> {
        let result = self.evaluate().await;
        counter!("forecast_requests_total", "outcome" => outcome(&result)).increment(1);
        result
    }

    /// One periodic cycle: compute and persist.
    pub async fn run_periodic_cycle(&self) -> Result<ForecastRecord, ForecastError> {
        let result = match self.evaluate().await {
            Ok(forecast) => self
                .forecasts
                .append(forecast.evaluated_at, &forecast.label)
                .await
                .map_err(ForecastError::from),
            Err(e) => Err(e),
        };
        counter!("forecast_cycles_total", "outcome" => outcome(&result)).increment(1);
        result
    }
}

fn outcome<T>(result: &Result<T, ForecastError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(ForecastError::InsufficientData { .. }) => "insufficient_data",
        Err(ForecastError::Storage(_)) => "storage_error",
    }
}
