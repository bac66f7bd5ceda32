//! Enterprise system-configuration updates, one setting per record

use super::{required, BuildContext, DispatchJob, JobBuilder};
use crate::dispatch::{Endpoint, FormPayload, TransportResponse};
use crate::error::RecordError;
use crate::mapping::enterprise_sid;
use crate::source::Record;

pub const ENDPOINT_PREFIX: &str = "/MercuryGate/enterprise/";

pub const PRIMARY_FIELD: &str = "page";
pub const SETTING_FIELD: &str = "setting";
pub const VALUE_FIELD: &str = "value";

#[derive(Debug, Clone, Default)]
pub struct SysConfigBuilder;

impl JobBuilder for SysConfigBuilder {
    fn build(&self, record: &Record, ctx: &BuildContext<'_>) -> Result<DispatchJob, RecordError> {
        let page = record.field(PRIMARY_FIELD).unwrap_or_default();
        let setting = required(record, page, SETTING_FIELD)?;
        let value = required(record, page, VALUE_FIELD)?;

        if page.contains(|c: char| matches!(c, '/' | '?' | '#')) {
            return Err(RecordError::Internal(format!(
                "Invalid settings page name '{page}'"
            )));
        }

        let enterprise = ctx
            .config
            .require("ENTERPRISE")
            .map_err(|e| RecordError::Internal(e.to_string()))?;

        let payload = FormPayload::new()
            .with("sidEnterprise", enterprise_sid(enterprise))
            .with(setting, value);

        Ok(DispatchJob {
            row: record.index(),
            key: format!("{page}:{setting}"),
            endpoint: Endpoint::new(format!("{ENDPOINT_PREFIX}{page}")),
            payload,
        })
    }

    fn describe_success(&self, _job: &DispatchJob, response: &TransportResponse) -> String {
        format!("{} - OK", response.status)
    }
}
