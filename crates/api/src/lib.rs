//! Weather Station API Server
//!
//! HTTP surface over the forecast engine: current conditions, pressure
//! history, stored and on-demand forecasts, and the ingest endpoint the
//! station posts its readings to.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use forecast_scheduler::{ForecastEngine, ForecastScheduler};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use weather_store::{SampleValidator, SqliteRepository};

pub mod settings;
mod error;
mod routes;

pub use settings::{AppConfig, LogFormat, LoggingConfig};
pub use error::{ApiError, ErrorBody};

/// Engine over the SQLite stores
pub type Engine = ForecastEngine<SqliteRepository, SqliteRepository>;

/// Application state shared across handlers
pub struct AppState {
    /// Forecast engine
    pub engine: Arc<Engine>,
    /// Storage repository, for ingest
    pub repository: SqliteRepository,
    /// Ingest range checks
    pub validator: SampleValidator,
    /// Prometheus recorder, when installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Arc<Engine>, repository: SqliteRepository) -> Self {
        Self {
            engine,
            repository,
            validator: SampleValidator::default(),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: &'static str,
    pub forecast: &'static str,
    pub last_forecast_at: Option<i64>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/conditions", get(routes::conditions::get_conditions))
        .route("/api/v1/pressure", get(routes::pressure::get_pressure))
        .route("/api/v1/forecast", get(routes::forecast::get_latest))
        .route("/api/v1/forecast/now", get(routes::forecast::get_now))
        .route("/api/v1/forecasts", get(routes::forecast::get_history))
        .route("/api/v1/samples", axum::routing::post(routes::samples::post_sample))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (database, forecast, last_forecast_at) = match state.engine.latest_forecast().await {
        Ok(Some(record)) => {
            let forecast = if state.engine.is_stale(&record) {
                "stale"
            } else {
                "ok"
            };
            ("ok", forecast, Some(record.created_at.timestamp()))
        }
        Ok(None) => ("ok", "pending", None),
        Err(_) => ("unavailable", "unknown", None),
    };

    let response = HealthResponse {
        status: if database == "ok" { "healthy" } else { "degraded" },
        timestamp: state.engine.now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            database,
            forecast,
            last_forecast_at,
        },
    };

    Json(response)
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = parse_level(&config.level)?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    match config.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

fn parse_level(level: &str) -> anyhow::Result<Level> {
    Level::from_str(level.trim())
        .map_err(|_| anyhow::anyhow!("Unknown log level {:?}: expected trace, debug, info, warn or error", level))
}

/// Run the server and the periodic forecast until Ctrl-C
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    config.engine.validate()?;

    let repository = SqliteRepository::connect(&config.database).await?;
    let engine = Arc::new(ForecastEngine::new(
        config.engine.clone(),
        repository.clone(),
        repository.clone(),
    ));

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = ForecastScheduler::new(engine.clone()).spawn(stop_rx);

    let metrics = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(engine, repository.clone()).with_metrics(metrics));
    let app = create_router(state);

    info!("Starting API server on {}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    let _ = stop_tx.send(true);
    scheduler.await?;
    repository.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("WARN").unwrap(), Level::WARN);
    }

    #[test]
    fn test_misspelled_level_is_rejected() {
        let config = LoggingConfig {
            level: "inof".to_string(),
            ..Default::default()
        };
        let err = init_logging(&config).unwrap_err();
        assert!(err.to_string().contains("inof"));
    }
}
