//! Error taxonomy for the ROI pipeline
//!
//! Configuration problems are fatal and abort the run. Per-record data issues
//! never surface here; they degrade that record's participation in ranking and
//! are aggregated into the validation report instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoiError {
    /// Fatal setup problem, e.g. a county table with zero total survey weight.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A column the pipeline cannot work without is absent after header
    /// normalization and alias resolution.
    #[error("missing required column `{column}` in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("failed to serialize report: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, RoiError>;
