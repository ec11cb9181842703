//! Gold price and USD/INR exchange rate forecasting from two linear models.
//!
//! The `train` binary fits the models from CSV data; the `rate_forecast`
//! binary serves them over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod training;
pub mod utils;

pub use error::ForecastError;
pub use service::{ModelPaths, PredictionService};
