//! Sample Ingest Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use weather_store::Sample;

use crate::{ApiError, AppState};

/// Reading posted by the station
#[derive(Debug, Deserialize)]
pub struct SamplePayload {
    /// Outdoor temperature (°C)
    pub outdoor: f64,
    /// Indoor temperature (°C)
    pub indoor: f64,
    /// Station pressure (hPa). The station's `pressure_mmhg` field is
    /// ignored and derived from this on read.
    pub pressure_hpa: f64,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
}

/// Store a station reading stamped with the server clock
pub async fn post_sample(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SamplePayload>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        debug!("Rejected sample payload: {}", e);
        ApiError::BadRequest("Missing fields".to_string())
    })?;

    let sample = Sample::new(state.engine.now(), payload.pressure_hpa, payload.outdoor)
        .with_indoor(payload.indoor);
    state.validator.validate(&sample)?;

    state.repository.insert_sample(&sample).await?;
    Ok(Json(IngestResponse { status: "ok" }))
}
