// src/utils/mod.rs

pub mod data_processing;
pub mod plotting;

pub use data_processing::{
    calculate_mse,
    date_features,
    date_range,
    load_series,
    parse_request_date,
    train_test_split,
};
pub use plotting::render_forecast_chart;
