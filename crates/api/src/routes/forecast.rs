//! Forecast Routes

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use forecast_scheduler::ForecastResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use weather_store::ForecastRecord;

use crate::{ApiError, AppState};

/// A stored forecast with its freshness
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub forecast: String,
    /// Older than one scheduling period
    pub stale: bool,
}

impl ForecastResponse {
    fn from_record(state: &AppState, record: ForecastRecord) -> Self {
        Self {
            stale: state.engine.is_stale(&record),
            id: record.id,
            created_at: record.created_at,
            forecast: record.forecast,
        }
    }
}

/// Query parameters for forecast history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    24
}

/// Response for forecast history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub data: Vec<ForecastResponse>,
    pub count: usize,
}

/// Get the last scheduled forecast
pub async fn get_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let record = state
        .engine
        .latest_forecast()
        .await?
        .ok_or(ApiError::NotFound("Forecast is not ready yet"))?;

    Ok(Json(ForecastResponse::from_record(&state, record)))
}

/// Compute a forecast from the current window without storing it
pub async fn get_now(State(state): State<Arc<AppState>>) -> Result<Json<ForecastResult>, ApiError> {
    let result = state.engine.compute_forecast_now().await?;
    Ok(Json(result))
}

/// Get stored forecasts, newest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = params.limit.min(500);

    let data: Vec<ForecastResponse> = state
        .engine
        .recent_forecasts(limit)
        .await?
        .into_iter()
        .map(|record| ForecastResponse::from_record(&state, record))
        .collect();

    Ok(Json(HistoryResponse {
        count: data.len(),
        data,
    }))
}
