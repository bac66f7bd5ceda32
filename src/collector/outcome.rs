use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a record failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    MappingNotFound,
    Validation,
    Network,
    RemoteStatus,
    Internal,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::MappingNotFound => "mapping_not_found",
            FailureCategory::Validation => "validation",
            FailureCategory::Network => "network",
            FailureCategory::RemoteStatus => "remote_status",
            FailureCategory::Internal => "internal",
        }
    }
}

/// Terminal result recorded for one input record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        description: String,
    },
    Failure {
        category: FailureCategory,
        message: String,
        /// Written in front of `Error:`, e.g. the record's natural key
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subject: Option<String>,
    },
}

impl Outcome {
    pub fn success(description: impl Into<String>) -> Self {
        Outcome::Success {
            description: description.into(),
        }
    }

    pub fn failure(category: FailureCategory, message: impl Into<String>) -> Self {
        Outcome::Failure {
            category,
            message: message.into(),
            subject: None,
        }
    }

    /// Prefix a failure's written text with `subject`; successes are unchanged
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        if let Outcome::Failure { subject: slot, .. } = &mut self {
            *slot = Some(subject.into());
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { category, .. } => Some(*category),
        }
    }
}

impl From<RecordError> for Outcome {
    fn from(err: RecordError) -> Self {
        let category = match &err {
            RecordError::MappingNotFound { .. } => FailureCategory::MappingNotFound,
            RecordError::Validation { .. } | RecordError::InvalidEncoding { .. } => {
                FailureCategory::Validation
            }
            RecordError::Network(_) => FailureCategory::Network,
            RecordError::RemoteStatus { .. } => FailureCategory::RemoteStatus,
            RecordError::Internal(_) => FailureCategory::Internal,
        };
        Outcome::failure(category, err.to_string())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success { description } => write!(f, "{description}"),
            Outcome::Failure {
                message,
                subject: Some(subject),
                ..
            } => write!(f, "{subject} Error: {message}"),
            Outcome::Failure { message, .. } => write!(f, "Error: {message}"),
        }
    }
}
