//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forecast_scheduler::ForecastError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use weather_store::{StorageError, ValidationError};

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Nothing stored yet; not a failure
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("Not enough data for a forecast: need at least {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::InsufficientData {
                required,
                available,
            } => ApiError::InsufficientData {
                required,
                available,
            },
            ForecastError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(StorageError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ApiError::Storage(e) = &self {
            warn!("Request failed on storage: {}", e);
        }

        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
