//! Job building
//!
//! A [`JobBuilder`] turns one [`Record`] into a [`DispatchJob`] or a
//! record-scoped error. Builders are pure with respect to the record and the
//! read-only [`BuildContext`]; they never touch the network.

use crate::collector::Outcome;
use crate::config::RunConfig;
use crate::dispatch::{Endpoint, FormPayload, TransportResponse};
use crate::error::RecordError;
use crate::mapping::IdentifierResolver;
use crate::source::{Record, RowIndex};

pub mod admin_command;
pub mod pickup;
pub mod price_sheet;
pub mod status_message;
pub mod sys_config;

pub use admin_command::AdminCommandBuilder;
pub use price_sheet::PriceSheetBuilder;
pub use status_message::StatusMessageBuilder;
pub use sys_config::SysConfigBuilder;

/// One fully built request tied to exactly one input record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchJob {
    pub row: RowIndex,
    /// Natural key of the record, used in logs and descriptions
    pub key: String,
    pub endpoint: Endpoint,
    pub payload: FormPayload,
}

/// Read-only state shared by every build
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub config: &'a RunConfig,
    pub resolver: &'a IdentifierResolver,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a RunConfig, resolver: &'a IdentifierResolver) -> Self {
        Self { config, resolver }
    }
}

pub trait JobBuilder: Send + Sync {
    /// Build the dispatch job for `record`
    fn build(&self, record: &Record, ctx: &BuildContext<'_>) -> Result<DispatchJob, RecordError>;

    /// Human-readable description of a successful response
    fn describe_success(&self, _job: &DispatchJob, response: &TransportResponse) -> String {
        format!("{} OK", response.status)
    }

    /// Failure outcome for the record keyed `key`
    fn describe_failure(&self, _key: &str, err: RecordError) -> Outcome {
        err.into()
    }
}

/// Value of a required field, or a validation error tagged with the record's key
pub(crate) fn required<'r>(
    record: &'r Record,
    key: &str,
    field: &str,
) -> Result<&'r str, RecordError> {
    record
        .field(field)
        .ok_or_else(|| RecordError::missing_field(key, record.index(), field))
}
