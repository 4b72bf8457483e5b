use chrono::{DateTime, Duration, TimeZone, Utc};
use forecast_scheduler::{Clock, EngineConfig, ForecastEngine, ForecastError, ManualClock};
use std::sync::Arc;
use weather_store::{ForecastLog, Repository, Sample, SampleSource, StorageError};

fn start() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

struct Station {
    repo: Arc<Repository>,
    clock: Arc<ManualClock>,
    engine: ForecastEngine<Arc<Repository>, Arc<Repository>>,
}

fn station() -> Station {
    let repo = Arc::new(Repository::new());
    let clock = Arc::new(ManualClock::new(start()));
    let engine = ForecastEngine::new(EngineConfig::default(), repo.clone(), repo.clone())
        .with_clock(clock.clone());
    Station {
        repo,
        clock,
        engine,
    }
}

/// Six samples over the last three hours, 1008.0 -> 1012.0 hPa at 15 °C
fn add_rising_samples(station: &Station) {
    let now = station.clock.now();
    for i in 0..6 {
        let ts = now - Duration::minutes(36 * (5 - i));
        station
            .repo
            .insert_sample(Sample::new(ts, 1008.0 + 0.8 * i as f64, 15.0))
            .unwrap();
    }
}

#[tokio::test]
async fn test_rising_pressure_scenario() {
    let station = station();
    add_rising_samples(&station);

    let now = station.engine.compute_forecast_now().await.unwrap();
    assert!(now.trend.is_rising(), "trend was {:?}", now.trend);
    assert!(now.label.starts_with("rising"), "label was {}", now.label);
    assert_eq!(now.sample_count, 6);
    assert_eq!(now.temperature_c, 15.0);

    let record = station.engine.run_periodic_cycle().await.unwrap();
    assert_eq!(record.forecast, now.label);

    let latest = station.engine.latest_forecast().await.unwrap().unwrap();
    assert_eq!(latest, record);
    assert_eq!(latest.created_at, start());
}

#[tokio::test]
async fn test_sparse_data_scenario() {
    let station = station();

    for hours in [5, 3, 1] {
        let ts = start() - Duration::hours(hours);
        station
            .repo
            .insert_sample(Sample::new(ts, 1010.0, 12.0))
            .unwrap();
    }

    let err = station.engine.compute_forecast_now().await.unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData {
            required: 6,
            available: 3
        }
    ));

    let err = station.engine.run_periodic_cycle().await.unwrap_err();
    assert!(err.is_insufficient_data());

    assert!(station.engine.latest_forecast().await.unwrap().is_none());
    assert_eq!(station.repo.forecast_count(), 0);
}

#[tokio::test]
async fn test_sparse_data_keeps_previous_forecast() {
    let station = station();
    station
        .repo
        .append(start() - Duration::hours(1), "steady, fine weather")
        .await
        .unwrap();

    station
        .repo
        .insert_sample(Sample::new(start(), 1010.0, 12.0))
        .unwrap();
    assert!(station.engine.run_periodic_cycle().await.is_err());

    let latest = station.engine.latest_forecast().await.unwrap().unwrap();
    assert_eq!(latest.forecast, "steady, fine weather");
}

#[tokio::test]
async fn test_empty_store_scenario() {
    let station = station();

    assert!(station.engine.current_conditions().await.unwrap().is_none());
    assert!(station
        .engine
        .pressure_series(Duration::hours(3))
        .await
        .unwrap()
        .is_empty());
    assert!(station.engine.latest_forecast().await.unwrap().is_none());
}

#[tokio::test]
async fn test_on_demand_never_touches_latest() {
    let station = station();
    add_rising_samples(&station);
    let persisted = station.engine.run_periodic_cycle().await.unwrap();

    // the weather turns; asking now must not replace the stored forecast
    station.clock.advance(Duration::minutes(30));
    station
        .repo
        .insert_sample(Sample::new(start() + Duration::minutes(30), 990.0, 9.0))
        .unwrap();

    for _ in 0..3 {
        station.engine.compute_forecast_now().await.unwrap();
    }

    assert_eq!(station.engine.latest_forecast().await.unwrap(), Some(persisted));
    assert_eq!(station.repo.forecast_count(), 1);
}

#[tokio::test]
async fn test_latest_is_last_periodic_cycle() {
    let station = station();
    add_rising_samples(&station);

    let mut last = None;
    for _ in 0..4 {
        last = Some(station.engine.run_periodic_cycle().await.unwrap());
        station.clock.advance(Duration::minutes(10));
    }

    let latest = station.engine.latest_forecast().await.unwrap();
    assert_eq!(latest, last);
    assert_eq!(latest.unwrap().id, 4);
    assert_eq!(station.engine.recent_forecasts(10).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_window_ignores_old_samples() {
    let station = station();

    // plenty of samples, but all older than twice the horizon
    for i in 0..10 {
        let ts = start() - Duration::hours(8) + Duration::minutes(10 * i);
        station
            .repo
            .insert_sample(Sample::new(ts, 1000.0, 5.0))
            .unwrap();
    }

    let err = station.engine.compute_forecast_now().await.unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData { available: 0, .. }
    ));

    // the current-conditions query still sees the newest sample
    let current = station.engine.current_conditions().await.unwrap().unwrap();
    assert_eq!(current.timestamp, start() - Duration::hours(8) + Duration::minutes(90));
}

#[tokio::test]
async fn test_pressure_series_uses_requested_horizon() {
    let station = station();
    add_rising_samples(&station);

    let series = station
        .engine
        .pressure_series(Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(series.len(), 2);
    assert!(series[0].timestamp < series[1].timestamp);
}

#[tokio::test]
async fn test_staleness_follows_interval() {
    let station = station();
    add_rising_samples(&station);
    let record = station.engine.run_periodic_cycle().await.unwrap();

    station.clock.advance(Duration::minutes(59));
    assert!(!station.engine.is_stale(&record));

    station.clock.advance(Duration::minutes(2));
    assert!(station.engine.is_stale(&record));
}

struct Offline;

impl SampleSource for Offline {
    async fn samples_since(&self, _since: DateTime<Utc>) -> Result<Vec<Sample>, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }

    async fn latest_sample(&self) -> Result<Option<Sample>, StorageError> {
        Err(StorageError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_storage_failure_is_reported() {
    let log = Arc::new(Repository::new());
    let engine = ForecastEngine::new(EngineConfig::default(), Offline, log.clone());

    let err = engine.compute_forecast_now().await.unwrap_err();
    assert!(matches!(err, ForecastError::Storage(StorageError::Unavailable(_))));

    let err = engine.run_periodic_cycle().await.unwrap_err();
    assert!(!err.is_insufficient_data());
    assert_eq!(log.forecast_count(), 0);
}

#[tokio::test]
async fn test_oversized_horizon_selects_everything() {
    let repo = Arc::new(Repository::new());
    let clock = Arc::new(ManualClock::new(start()));
    let config = EngineConfig {
        horizon_hours: u32::MAX,
        ..Default::default()
    };
    let engine = ForecastEngine::new(config, repo.clone(), repo.clone()).with_clock(clock);

    let err = engine.compute_forecast_now().await.unwrap_err();
    assert!(err.is_insufficient_data());

    for i in 0..6 {
        let ts = start() - Duration::days(400) + Duration::hours(i);
        repo.insert_sample(Sample::new(ts, 1010.0, 12.0)).unwrap();
    }
    let result = engine.compute_forecast_now().await.unwrap();
    assert_eq!(result.sample_count, 6);
    assert!(engine.run_periodic_cycle().await.is_ok());
}

#[tokio::test]
async fn test_window_lower_bound_with_subsecond_clock() {
    let station = station();
    station
        .repo
        .insert_sample(Sample::new(start() - Duration::hours(3), 1010.0, 12.0))
        .unwrap();

    station.clock.set(start() + Duration::milliseconds(500));
    let window = station.engine.select_window(Duration::hours(3)).await.unwrap();
    assert!(window.is_empty());

    station.clock.set(start());
    let window = station.engine.select_window(Duration::hours(3)).await.unwrap();
    assert_eq!(window.len(), 1);
}
