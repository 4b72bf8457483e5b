//! Pressure History Route

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// One week
const MAX_HOURS: u32 = 7 * 24;

/// Query parameters for pressure endpoint
#[derive(Debug, Deserialize)]
pub struct PressureQuery {
    /// History length in hours; defaults to the forecast horizon
    pub hours: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PressurePoint {
    pub timestamp: DateTime<Utc>,
    pub pressure_hpa: f64,
}

/// Response for pressure endpoint
#[derive(Debug, Serialize)]
pub struct PressureResponse {
    pub hours: u32,
    pub count: usize,
    /// Last minus first pressure in the window (hPa)
    pub delta_hpa: Option<f64>,
    pub latest_hpa: Option<f64>,
    pub data: Vec<PressurePoint>,
}

/// Get station pressure over the last N hours
pub async fn get_pressure(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PressureQuery>,
) -> Result<Json<PressureResponse>, ApiError> {
    let hours = params
        .hours
        .unwrap_or(state.engine.config().horizon_hours)
        .clamp(1, MAX_HOURS);

    let window = state
        .engine
        .pressure_series(Duration::hours(i64::from(hours)))
        .await?;

    let first = window.first().map(|s| s.pressure_hpa);
    let latest = window.last().map(|s| s.pressure_hpa);
    let delta_hpa = first.zip(latest).map(|(first, last)| last - first);

    let data: Vec<PressurePoint> = window
        .into_iter()
        .map(|s| PressurePoint {
            timestamp: s.timestamp,
            pressure_hpa: s.pressure_hpa,
        })
        .collect();

    Ok(Json(PressureResponse {
        hours,
        count: data.len(),
        delta_hpa,
        latest_hpa: latest,
        data,
    }))
}
