// src/error.rs

use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::Series;

/// Errors raised while training models or serving predictions.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("{reason}")]
    InvalidDate { reason: String },

    #[error("Start date cannot be after end date.")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Prediction models not loaded. Please check the server logs.")]
    ModelUnavailable,

    #[error("{series} data file not found at {}", path.display())]
    DataNotFound { series: Series, path: PathBuf },

    #[error("Error processing {series} data: {reason}")]
    DataProcessing { series: Series, reason: String },

    #[error("Failed to write model artifact {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("An error occurred during prediction: {0}")]
    Prediction(String),
}

impl ForecastError {
    pub fn missing_date(field: &str) -> Self {
        ForecastError::InvalidDate {
            reason: format!("Missing '{}' parameter in request body.", field),
        }
    }

    pub fn missing_range_dates() -> Self {
        ForecastError::InvalidDate {
            reason: "Missing 'start_date' or 'end_date' parameter.".to_string(),
        }
    }

    pub fn unparsable_date(input: &str) -> Self {
        ForecastError::InvalidDate {
            reason: format!("Invalid date format '{}'. Please use YYYY-MM-DD.", input),
        }
    }

    pub fn processing(series: Series, reason: impl Into<String>) -> Self {
        ForecastError::DataProcessing {
            series,
            reason: reason.into(),
        }
    }
}

/// Reasons a persisted model could not be loaded.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact {} was fitted on features {found:?}, expected {expected:?}", path.display())]
    FeatureLayout {
        path: PathBuf,
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("artifact {} holds a {found} model, expected {expected}", path.display())]
    WrongSeries {
        path: PathBuf,
        found: Series,
        expected: Series,
    },
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for ForecastError {
    fn status_code(&self) -> StatusCode {
        match self {
            ForecastError::InvalidDate { .. } | ForecastError::InvalidRange { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
