//! Error types for the header checker.
//!
//! Request evaluation never fails; only configuration can be rejected.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("header count range for {browser} is inverted: min {min} > max {max}")]
    InvertedRange {
        browser: &'static str,
        min: usize,
        max: usize,
    },

    #[error("verdict header name must not be empty")]
    EmptyVerdictHeader,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
