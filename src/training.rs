// src/training.rs

use std::path::{Path, PathBuf};

use log::info;

use crate::error::ForecastError;
use crate::models::{FeatureVector, LinearModel, Observation, Series};
use crate::utils::{calculate_mse, date_features, load_series, train_test_split};

#[derive(Debug, Clone, Copy)]
pub struct TrainingOptions {
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub series: Series,
    pub training_rows: usize,
    pub evaluation_rows: usize,
    pub mse: f64,
    pub artifact: PathBuf,
}

/// Loads `input`, fits the series model and writes it to `output`.
///
/// Nothing is written unless every step before persisting succeeds.
pub fn train_series(
    series: Series,
    input: &Path,
    output: &Path,
    options: &TrainingOptions,
) -> Result<TrainingReport, ForecastError> {
    let observations = load_series(series, input)?;
    let model = fit_observations(series, &observations, options)?;
    model.save_to_file(output)?;
    info!("{} prediction model saved as {}", series, output.display());

    Ok(TrainingReport {
        series,
        training_rows: model.training_rows,
        evaluation_rows: model.evaluation_rows,
        mse: model.evaluation_mse.unwrap_or_default(),
        artifact: output.to_path_buf(),
    })
}

/// Splits, fits and evaluates a model from already-parsed observations.
pub fn fit_observations(
    series: Series,
    observations: &[Observation],
    options: &TrainingOptions,
) -> Result<LinearModel, ForecastError> {
    if !(options.test_fraction > 0.0 && options.test_fraction < 1.0) {
        return Err(ForecastError::processing(
            series,
            format!("test fraction {} outside (0, 1)", options.test_fraction),
        ));
    }
    if observations.len() < 2 {
        return Err(ForecastError::processing(
            series,
            format!(
                "need at least 2 complete rows to split, found {}",
                observations.len()
            ),
        ));
    }

    let features: Vec<FeatureVector> = observations.iter().map(|o| date_features(o.date)).collect();
    let (train, test) = train_test_split(observations.len(), options.test_fraction, options.seed);

    let pick_features = |idx: &[usize]| idx.iter().map(|&i| features[i]).collect::<Vec<_>>();
    let pick_targets = |idx: &[usize]| idx.iter().map(|&i| observations[i].target).collect::<Vec<_>>();

    let mut model = LinearModel::fit(series, &pick_features(&train), &pick_targets(&train))?;

    let predictions = model.predict(&pick_features(&test));
    let mse = calculate_mse(&predictions, &pick_targets(&test));
    info!(
        "{} Rate Linear Regression Mean Squared Error: {:.*}",
        series,
        series.precision(),
        mse
    );

    model.evaluation_rows = test.len();
    model.evaluation_mse = Some(mse);
    Ok(model)
}
