//! Error types for the bcdemux library

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemuxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("htslib error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to create sink for key '{key}' at {path:?}: {source}")]
    SinkCreate {
        key: String,
        path: PathBuf,
        #[source]
        source: Box<DemuxError>,
    },

    #[error("External step '{step}' failed: {status}")]
    External { step: String, status: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DemuxError {
    /// Shorthand for a configuration failure raised before any record is read.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DemuxError::Config(msg.into())
    }

    #[inline]
    pub fn is_config(&self) -> bool {
        matches!(self, DemuxError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
