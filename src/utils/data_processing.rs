// src/utils/data_processing.rs

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ForecastError;
use crate::models::{FeatureVector, Observation, Series};

/// Formats accepted in the exchange-rate `Date` column, tried in order.
const CSV_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];

/// Cell values read as missing, in addition to the empty cell.
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// Function to map a calendar date to the model features
pub fn date_features(date: NaiveDate) -> FeatureVector {
    FeatureVector {
        // 0001-01-01 is day 1
        date_ordinal: date.num_days_from_ce() as i64,
        month: date.month(),
        day_of_year: date.ordinal(),
    }
}

// Function to parse a `YYYY-MM-DD` date coming from an API request
pub fn parse_request_date(input: &str) -> Result<NaiveDate, ForecastError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ForecastError::unparsable_date(input))
}

// Function to enumerate every day from start to end inclusive
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

// Function to load a training CSV for the given series
pub fn load_series(series: Series, path: &Path) -> Result<Vec<Observation>, ForecastError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ForecastError::DataNotFound {
            series,
            path: path.to_path_buf(),
        },
        _ => ForecastError::processing(series, format!("cannot open {}: {}", path.display(), e)),
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::processing(series, e.to_string()))?
        .clone();
    let layout = ColumnLayout::resolve(series, &headers)?;

    let mut observations = Vec::new();
    let mut dropped = 0usize;
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ForecastError::processing(series, e.to_string()))?;
        // Header is line 1
        let line = index + 2;

        if record.iter().any(is_missing) {
            dropped += 1;
            continue;
        }

        let date = layout.date(&record).ok_or_else(|| {
            ForecastError::processing(series, format!("unparsable date on line {}", line))
        })?;
        let raw_target = &record[layout.target];
        let target = raw_target.replace(',', "").parse::<f64>().map_err(|_| {
            ForecastError::processing(
                series,
                format!(
                    "non-numeric {} '{}' on line {}",
                    series.target_column(),
                    raw_target,
                    line
                ),
            )
        })?;

        observations.push(Observation { date, target });
    }

    if dropped > 0 {
        debug!("{}: dropped {} rows with missing fields", series, dropped);
    }
    info!(
        "{} data loaded and preprocessed. Rows: {}",
        series,
        observations.len()
    );
    Ok(observations)
}

// Function to tell whether a (trimmed) cell holds no value
fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_MARKERS.iter().any(|marker| *marker == cell)
}

/// Column positions needed to turn a CSV record into an observation.
enum DateColumns {
    YearMonth { year: usize, month: usize },
    Date(usize),
}

struct ColumnLayout {
    date: DateColumns,
    target: usize,
}

impl ColumnLayout {
    fn resolve(series: Series, headers: &StringRecord) -> Result<Self, ForecastError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ForecastError::processing(series, format!("missing column '{}'", name)))
        };

        let date = match series {
            Series::Gold => DateColumns::YearMonth {
                year: find("Year")?,
                month: find("Month")?,
            },
            Series::InrUsd => DateColumns::Date(find("Date")?),
        };
        Ok(ColumnLayout {
            date,
            target: find(series.target_column())?,
        })
    }

    fn date(&self, record: &StringRecord) -> Option<NaiveDate> {
        match self.date {
            DateColumns::YearMonth { year, month } => {
                parse_year_month(&record[year], &record[month])
            }
            DateColumns::Date(column) => parse_csv_date(&record[column]),
        }
    }
}

// Function to build the first day of a month from `Year` and `Month` cells
pub fn parse_year_month(year: &str, month: &str) -> Option<NaiveDate> {
    let year = year.parse::<f64>().ok().filter(|y| y.fract() == 0.0)? as i32;
    let month_number = match month.parse::<u32>() {
        Ok(m) => m,
        Err(_) => NaiveDate::parse_from_str(&format!("2000-{}-01", month), "%Y-%B-%d")
            .ok()?
            .month(),
    };
    NaiveDate::from_ymd_opt(year, month_number, 1)
}

// Function to parse a date cell in any of the supported layouts
pub fn parse_csv_date(cell: &str) -> Option<NaiveDate> {
    CSV_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

// Function to shuffle row indices into training and evaluation partitions
pub fn train_test_split(
    rows: usize,
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..rows).collect();
    if rows < 2 {
        return (indices, Vec::new());
    }
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((rows as f64 * test_fraction).ceil() as usize).clamp(1, rows - 1);
    let train = indices.split_off(test_len);
    (train, indices)
}

// Function to calculate the mean squared error
pub fn calculate_mse(predictions: &[f64], targets: &[f64]) -> f64 {
    predictions
        .iter()
        .zip(targets)
        .map(|(pred, target)| (pred - target).powi(2))
        .sum::<f64>()
        / predictions.len() as f64
}
