// src/error.rs

use thiserror::Error;

/// Every failure the library can surface. Nothing is retried or recovered
/// internally; callers decide whether to try again.
#[derive(Debug, Error)]
pub enum BicimadError {
    /// The index page could not be fetched or listed no trip archives.
    #[error("could not discover trip archives from {url}: {reason}")]
    Discovery { url: String, reason: String },

    /// The period is valid but nothing is published for it.
    #[error("no trip archive published for {year}-{month:02} (data is available from {first} to {last})")]
    NotFound {
        year: i32,
        month: u32,
        first: String,
        last: String,
    },

    /// Month or year outside the representable bounds.
    #[error("{what} {value} is out of range (expected {min}..={max})")]
    Range {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    /// Archive or CSV content does not have the expected shape.
    #[error("unexpected data format: {0}")]
    Format(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = BicimadError> = std::result::Result<T, E>;

impl From<arrow::error::ArrowError> for BicimadError {
    fn from(e: arrow::error::ArrowError) -> Self {
        BicimadError::Format(e.to_string())
    }
}

impl From<zip::result::ZipError> for BicimadError {
    fn from(e: zip::result::ZipError) -> Self {
        BicimadError::Format(format!("zip: {}", e))
    }
}
