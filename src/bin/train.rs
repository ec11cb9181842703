// src/bin/train.rs

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

use rate_forecast::models::Series;
use rate_forecast::training::{train_series, TrainingOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeriesArg {
    Gold,
    InrUsd,
    All,
}

impl SeriesArg {
    fn series(self) -> Vec<Series> {
        match self {
            SeriesArg::Gold => vec![Series::Gold],
            SeriesArg::InrUsd => vec![Series::InrUsd],
            SeriesArg::All => Series::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Fit the gold and USD/INR regression models", long_about = None)]
struct Args {
    /// Which model(s) to train
    #[arg(long, value_enum, default_value_t = SeriesArg::All)]
    series: SeriesArg,

    /// Gold CSV with Year, Month and Avg_24K_Price columns
    #[arg(long, default_value = Series::Gold.default_dataset())]
    gold_input: PathBuf,

    /// USD/INR CSV with Date and INR_per_USD columns
    #[arg(long, default_value = Series::InrUsd.default_dataset())]
    inr_usd_input: PathBuf,

    /// Directory the model artifacts are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Seed for the train/evaluation shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Share of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = TrainingOptions {
        test_fraction: args.test_fraction,
        seed: args.seed,
    };

    let mut failed = false;
    for series in args.series.series() {
        let input = match series {
            Series::Gold => &args.gold_input,
            Series::InrUsd => &args.inr_usd_input,
        };
        let output = args.output_dir.join(series.default_artifact());

        info!("--- Starting {} Model Training ---", series);
        match train_series(series, input, &output, &options) {
            Ok(report) => info!(
                "{} model: {} training rows, {} evaluation rows, MSE {:.*}",
                series,
                report.training_rows,
                report.evaluation_rows,
                series.precision(),
                report.mse
            ),
            Err(e) => {
                error!("{} model training failed: {}", series, e);
                failed = true;
            }
        }
        info!("--- {} Model Training Finished ---", series);
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
