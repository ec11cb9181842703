// src/models/regression.rs

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, ForecastError};
use crate::models::{FeatureVector, Series, FEATURE_NAMES};

/// Ordinary least squares fit over the three date features.
///
/// `prediction = intercept + Σ coefficients[i] * feature[i]`, with features in
/// `FEATURE_NAMES` order. The feature names are persisted with the model so a
/// reordered or renamed feature set is caught at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub series: Series,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: [f64; 3],
    pub training_rows: usize,
    pub evaluation_rows: usize,
    pub evaluation_mse: Option<f64>,
}

impl LinearModel {
    /// Fits the model on `features`/`targets`.
    ///
    /// Columns are mean-centered and solved through SVD, so collinear or
    /// constant columns yield the minimum-norm solution instead of failing.
    pub fn fit(
        series: Series,
        features: &[FeatureVector],
        targets: &[f64],
    ) -> Result<Self, ForecastError> {
        if features.len() != targets.len() {
            return Err(ForecastError::processing(
                series,
                format!(
                    "{} feature rows but {} targets",
                    features.len(),
                    targets.len()
                ),
            ));
        }
        if features.is_empty() {
            return Err(ForecastError::processing(series, "no rows to fit"));
        }
        if let Some(bad) = targets.iter().find(|t| !t.is_finite()) {
            return Err(ForecastError::processing(
                series,
                format!("non-finite target value {}", bad),
            ));
        }

        let n = features.len();
        let rows: Vec<[f64; 3]> = features.iter().map(FeatureVector::as_array).collect();

        let mut means = [0.0; 3];
        for row in &rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        means.iter_mut().for_each(|m| *m /= n as f64);
        let target_mean = targets.iter().sum::<f64>() / n as f64;

        let x = DMatrix::from_fn(n, 3, |r, c| rows[r][c] - means[c]);
        let y = DVector::from_iterator(n, targets.iter().map(|t| t - target_mean));

        let svd = x.svd(true, true);
        let eps = svd.singular_values.max() * n.max(3) as f64 * f64::EPSILON;
        let weights = svd
            .solve(&y, eps)
            .map_err(|e| ForecastError::processing(series, e))?;

        let coefficients = [weights[0], weights[1], weights[2]];
        let intercept = target_mean
            - coefficients
                .iter()
                .zip(means.iter())
                .map(|(w, m)| w * m)
                .sum::<f64>();

        debug!(
            "{} fit on {} rows: intercept {:.6}, coefficients {:?}",
            series, n, intercept, coefficients
        );

        Ok(LinearModel {
            series,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            intercept,
            coefficients,
            training_rows: n,
            evaluation_rows: 0,
            evaluation_mse: None,
        })
    }

    pub fn predict_one(&self, features: &FeatureVector) -> f64 {
        features
            .as_array()
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept
    }

    /// Predicts every row in one pass.
    pub fn predict(&self, features: &[FeatureVector]) -> Vec<f64> {
        features.iter().map(|f| self.predict_one(f)).collect()
    }

    /// Saves the model as JSON, writing a sibling temp file first and renaming
    /// it into place.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ForecastError> {
        let write_err = |source: io::Error| ForecastError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let serialized = serde_json::to_string_pretty(self).map_err(|e| write_err(e.into()))?;
        let tmp = temp_sibling(path);
        if let Err(e) = fs::write(&tmp, serialized).and_then(|_| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        Ok(())
    }

    /// Loads a model from JSON and checks it belongs to `expected` and was fitted
    /// on the current feature layout.
    pub fn load_from_file(path: &Path, expected: Series) -> Result<Self, ArtifactError> {
        let data = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: LinearModel =
            serde_json::from_str(&data).map_err(|source| ArtifactError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        if model.series != expected {
            return Err(ArtifactError::WrongSeries {
                path: path.to_path_buf(),
                found: model.series,
                expected,
            });
        }
        if model.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ArtifactError::FeatureLayout {
                path: path.to_path_buf(),
                found: model.feature_names,
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            });
        }
        Ok(model)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date_features;
    use chrono::{Duration, NaiveDate};

    fn daily_features(days: i64) -> Vec<FeatureVector> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        (0..days)
            .map(|i| date_features(start + Duration::days(i)))
            .collect()
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("rate_forecast_regression_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        let features = daily_features(730);
        let targets: Vec<f64> = features
            .iter()
            .map(|f| {
                5.0 + 0.5 * f.date_ordinal as f64
                    + 3.0 * f.month as f64
                    + 0.2 * f.day_of_year as f64
            })
            .collect();

        let model = LinearModel::fit(Series::Gold, &features, &targets).unwrap();

        for (f, t) in features.iter().zip(&targets) {
            assert!((model.predict_one(f) - t).abs() < 1e-4);
        }
        assert!((model.coefficients[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn constant_columns_do_not_break_fit() {
        // Every row shares month and day of year, only the ordinal moves.
        let features: Vec<FeatureVector> = (0..5)
            .map(|i| FeatureVector {
                date_ordinal: 738000 + i,
                month: 1,
                day_of_year: 1,
            })
            .collect();
        let targets: Vec<f64> = (0..5).map(|i| 100.0 + 2.0 * i as f64).collect();

        let model = LinearModel::fit(Series::InrUsd, &features, &targets).unwrap();

        assert!(model.coefficients[1].abs() < 1e-9);
        assert!(model.coefficients[2].abs() < 1e-9);
        assert!((model.predict_one(&features[4]) - 108.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let features = daily_features(3);
        let err = LinearModel::fit(Series::Gold, &features, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ForecastError::DataProcessing { .. }));
    }

    #[test]
    fn saved_model_loads_back() {
        let features = daily_features(10);
        let targets: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let model = LinearModel::fit(Series::Gold, &features, &targets).unwrap();
        let path = scratch_path("gold.json");

        model.save_to_file(&path).unwrap();
        let loaded = LinearModel::load_from_file(&path, Series::Gold).unwrap();

        assert_eq!(loaded, model);
        assert!(!temp_sibling(&path).exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_other_series() {
        let features = daily_features(4);
        let model = LinearModel::fit(Series::Gold, &features, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let path = scratch_path("series_mismatch.json");
        model.save_to_file(&path).unwrap();

        let err = LinearModel::load_from_file(&path, Series::InrUsd).unwrap_err();

        assert!(matches!(err, ArtifactError::WrongSeries { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_reordered_features() {
        let features = daily_features(4);
        let mut model = LinearModel::fit(Series::Gold, &features, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        model.feature_names.swap(1, 2);
        let path = scratch_path("reordered.json");
        model.save_to_file(&path).unwrap();

        let err = LinearModel::load_from_file(&path, Series::Gold).unwrap_err();

        assert!(matches!(err, ArtifactError::FeatureLayout { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = LinearModel::load_from_file(&scratch_path("absent.json"), Series::Gold)
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
