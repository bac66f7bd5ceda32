//! Two-tier error model
//!
//! [`Error`] is the fatal tier: it unwinds the whole run and only ever comes
//! from configuration, input files or client construction. [`RecordError`] is
//! the record tier: it is raised while building or dispatching a single record
//! and is always converted into a failure [`Outcome`](crate::collector::Outcome)
//! at the point of origin.

use crate::source::RowIndex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required config key: {key}")]
    MissingConfigKey { key: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether the error stems from configuration and should abort with a usage exit code
    pub fn is_config(&self) -> bool {
        matches!(self, Error::MissingConfigKey { .. } | Error::Config(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure scoped to one record; never aborts the batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Mapping not found for transport_id {external_id}")]
    MappingNotFound { external_id: String },

    #[error("Missing {field}")]
    Validation {
        key: String,
        row: RowIndex,
        field: String,
    },

    #[error("Invalid UTF-8 in {field}")]
    InvalidEncoding { field: String },

    #[error("{0}")]
    Network(String),

    #[error("{status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("{0}")]
    Internal(String),
}

impl RecordError {
    pub fn missing_field(key: impl Into<String>, row: RowIndex, field: impl Into<String>) -> Self {
        RecordError::Validation {
            key: key.into(),
            row,
            field: field.into(),
        }
    }
}
