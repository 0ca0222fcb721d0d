use std::path::PathBuf;
use thiserror::Error;

use crate::api::tradingeconomics::FetchError;

/// The page could not be turned into price rows
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No table rows with a label and a value were found on the page")]
    NoRows,
}

/// Dataset, summary or chart file errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Corrupt dataset {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Chart error: {0}")]
    Chart(String),
}

/// Invalid configuration value
#[derive(Debug, Error)]
#[error("Invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Any error that aborts a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Shorten a response body for log and error messages
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
