use std::fmt;
use std::io;

use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record schema error: {0}")]
    Schema(String),
    #[error("script conversion setup error: {0}")]
    Script(String),
    #[error("{count} validation error(s), no artifacts written")]
    Validation { count: usize },
}

/// One accumulated validation failure, attributed to a series record
/// and a location within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub series: String,
    pub location: String,
    pub message: String,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.series, self.location, self.message)
    }
}

/// Collector threaded through validation and merge. Errors are logged
/// as they are recorded; the run decides success only after the whole
/// input set has been processed.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<RecordError>,
}

impl Diagnostics {
    pub fn record(
        &mut self,
        series: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) {
        let entry = RecordError {
            series: series.into(),
            location: location.into(),
            message: message.into(),
        };
        error!(series = %entry.series, location = %entry.location, "{}", entry.message);
        self.errors.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }
}
