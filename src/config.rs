// src/config.rs

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::Series;
use crate::service::ModelPaths;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server settings, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub models: ModelPaths,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => 5000,
        };
        let workers = match lookup("WORKERS") {
            Some(value) => Some(
                value
                    .parse::<usize>()
                    .ok()
                    .filter(|w| *w > 0)
                    .ok_or(ConfigError::InvalidValue {
                        name: "WORKERS",
                        expected: "positive integer",
                        value,
                    })?,
            ),
            None => None,
        };

        let model_dir = PathBuf::from(lookup("MODEL_DIR").unwrap_or_else(|| ".".to_string()));
        let artifact = |key: &str, series: Series| {
            lookup(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| model_dir.join(series.default_artifact()))
        };
        let models = ModelPaths {
            gold: artifact("GOLD_MODEL_PATH", Series::Gold),
            inr_usd: artifact("INR_USD_MODEL_PATH", Series::InrUsd),
        };

        Ok(ServerConfig {
            host,
            port,
            workers,
            models,
        })
    }
}
