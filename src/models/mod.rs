// src/models/mod.rs

pub mod regression;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names of the feature vector, in the order the models consume them.
pub const FEATURE_NAMES: [&str; 3] = ["Date_Ordinal", "Month", "Day_of_Year"];

/// The two target series served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Gold,
    InrUsd,
}

impl Series {
    pub const ALL: [Series; 2] = [Series::Gold, Series::InrUsd];

    /// Default CSV the trainer reads for this series.
    pub fn default_dataset(self) -> &'static str {
        match self {
            Series::Gold => "Gold_Rates_New_Delhi_2020_2025.csv",
            Series::InrUsd => "inr_usd_conversion_rates_past_2_years.csv",
        }
    }

    /// Default artifact file name, relative to the model directory.
    pub fn default_artifact(self) -> &'static str {
        match self {
            Series::Gold => "gold_prediction_model.json",
            Series::InrUsd => "inr_usd_prediction_model.json",
        }
    }

    pub fn target_column(self) -> &'static str {
        match self {
            Series::Gold => "Avg_24K_Price",
            Series::InrUsd => "INR_per_USD",
        }
    }

    /// Decimal places kept in API responses and training reports.
    pub fn precision(self) -> usize {
        match self {
            Series::Gold => 2,
            Series::InrUsd => 4,
        }
    }

    pub fn round(self, value: f64) -> f64 {
        let scale = 10f64.powi(self.precision() as i32);
        (value * scale).round() / scale
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Series::Gold => write!(f, "Gold"),
            Series::InrUsd => write!(f, "USD/INR"),
        }
    }
}

/// Numeric view of a calendar date shared by training and inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub date_ordinal: i64,
    pub month: u32,
    pub day_of_year: u32,
}

impl FeatureVector {
    /// Values in `FEATURE_NAMES` order.
    pub fn as_array(&self) -> [f64; 3] {
        [
            self.date_ordinal as f64,
            self.month as f64,
            self.day_of_year as f64,
        ]
    }
}

/// One labelled training row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub target: f64,
}

/// Both series predicted for a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub gold_rate: f64,
    pub inr_usd_rate: f64,
}

/// Response of a point query, already rounded for transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointPrediction {
    pub gold_rate: f64,
    pub inr_usd_rate: f64,
    pub date: NaiveDate,
}

// Re-export regression components
pub use regression::LinearModel;
