//! Current Conditions Route

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Latest station reading
#[derive(Debug, Serialize)]
pub struct ConditionsResponse {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub indoor_temperature_c: Option<f64>,
    pub pressure_hpa: f64,
    pub pressure_mmhg: f64,
}

/// Get the most recent sample
pub async fn get_conditions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConditionsResponse>, ApiError> {
    let sample = state
        .engine
        .current_conditions()
        .await?
        .ok_or(ApiError::NotFound("No weather data yet"))?;

    Ok(Json(ConditionsResponse {
        timestamp: sample.timestamp,
        temperature_c: sample.temperature_c,
        indoor_temperature_c: sample.indoor_temperature_c,
        pressure_hpa: sample.pressure_hpa,
        pressure_mmhg: sample.pressure_mmhg(),
    }))
}
