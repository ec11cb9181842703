// src/service.rs

use std::path::PathBuf;

use base64::Engine;
use log::{error, info};

use crate::error::ForecastError;
use crate::models::{DailyForecast, LinearModel, PointPrediction, Series};
use crate::utils::{date_features, date_range, parse_request_date, render_forecast_chart};

/// Filesystem locations of the two model artifacts.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub gold: PathBuf,
    pub inr_usd: PathBuf,
}

impl ModelPaths {
    pub fn path_for(&self, series: Series) -> &PathBuf {
        match series {
            Series::Gold => &self.gold,
            Series::InrUsd => &self.inr_usd,
        }
    }
}

enum ModelState {
    Ready {
        gold: LinearModel,
        inr_usd: LinearModel,
    },
    Unavailable {
        reason: String,
    },
}

/// Serves predictions from the two loaded models.
///
/// Built once at startup and shared read-only between workers. If either
/// artifact fails to load, the service stays up in the unavailable state and
/// every prediction returns `ForecastError::ModelUnavailable`.
pub struct PredictionService {
    state: ModelState,
}

/// Day-by-day forecast of a range together with its rendered chart.
#[derive(Debug, Clone)]
pub struct RangePrediction {
    pub forecast: Vec<DailyForecast>,
    pub png: Vec<u8>,
}

impl RangePrediction {
    pub fn plot_image_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png)
    }
}

impl PredictionService {
    pub fn new(gold: LinearModel, inr_usd: LinearModel) -> Self {
        PredictionService {
            state: ModelState::Ready { gold, inr_usd },
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        PredictionService {
            state: ModelState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// Loads both artifacts; any failure degrades to the unavailable state.
    pub fn load(paths: &ModelPaths) -> Self {
        let loaded = LinearModel::load_from_file(&paths.gold, Series::Gold).and_then(|gold| {
            LinearModel::load_from_file(&paths.inr_usd, Series::InrUsd)
                .map(|inr_usd| (gold, inr_usd))
        });

        match loaded {
            Ok((gold, inr_usd)) => {
                info!(
                    "Models loaded successfully from {} and {}",
                    paths.gold.display(),
                    paths.inr_usd.display()
                );
                PredictionService::new(gold, inr_usd)
            }
            Err(e) => {
                error!("Prediction models unavailable: {}", e);
                PredictionService::unavailable(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Ready { .. } => None,
            ModelState::Unavailable { reason } => Some(reason),
        }
    }

    fn models(&self) -> Result<(&LinearModel, &LinearModel), ForecastError> {
        match &self.state {
            ModelState::Ready { gold, inr_usd } => Ok((gold, inr_usd)),
            ModelState::Unavailable { .. } => Err(ForecastError::ModelUnavailable),
        }
    }

    /// Predicts both series for one date, rounded for transport.
    pub fn predict_point(&self, date: Option<&str>) -> Result<PointPrediction, ForecastError> {
        let (gold, inr_usd) = self.models()?;
        let date = parse_request_date(require_field(date, "date")?)?;

        let features = date_features(date);
        let gold_rate = finite(gold.predict_one(&features), Series::Gold)?;
        let inr_usd_rate = finite(inr_usd.predict_one(&features), Series::InrUsd)?;

        Ok(PointPrediction {
            gold_rate: Series::Gold.round(gold_rate),
            inr_usd_rate: Series::InrUsd.round(inr_usd_rate),
            date,
        })
    }

    /// Predicts both series for every day from `start` to `end` inclusive.
    pub fn forecast_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<DailyForecast>, ForecastError> {
        let (gold, inr_usd) = self.models()?;
        let (start, end) = match (non_blank(start), non_blank(end)) {
            (Some(start), Some(end)) => (parse_request_date(start)?, parse_request_date(end)?),
            _ => return Err(ForecastError::missing_range_dates()),
        };
        if start > end {
            return Err(ForecastError::InvalidRange { start, end });
        }

        let dates = date_range(start, end);
        let features: Vec<_> = dates.iter().copied().map(date_features).collect();
        let gold_rates = gold.predict(&features);
        let inr_usd_rates = inr_usd.predict(&features);

        dates
            .into_iter()
            .zip(gold_rates.into_iter().zip(inr_usd_rates))
            .map(|(date, (gold_rate, inr_usd_rate))| -> Result<_, ForecastError> {
                Ok(DailyForecast {
                    date,
                    gold_rate: finite(gold_rate, Series::Gold)?,
                    inr_usd_rate: finite(inr_usd_rate, Series::InrUsd)?,
                })
            })
            .collect()
    }

    /// Forecasts the range and renders it as a chart.
    pub fn predict_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<RangePrediction, ForecastError> {
        let forecast = self.forecast_range(start, end)?;
        let png = render_forecast_chart(&forecast)?;
        Ok(RangePrediction { forecast, png })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn require_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ForecastError> {
    non_blank(value).ok_or_else(|| ForecastError::missing_date(field))
}

fn finite(value: f64, series: Series) -> Result<f64, ForecastError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ForecastError::Prediction(format!(
            "{} model produced a non-finite value",
            series
        )))
    }
}
