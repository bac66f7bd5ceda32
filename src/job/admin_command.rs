//! Ad-hoc admin console commands

use super::{BuildContext, DispatchJob, JobBuilder};
use crate::dispatch::{Endpoint, FormPayload, TransportResponse};
use crate::error::RecordError;
use crate::mapping::encoded_enterprise_sid;
use crate::source::Record;
use regex::Regex;
use std::sync::LazyLock;

pub const ENDPOINT: &str = "/MercuryGate/util/adminConsole.jsp";

pub const PRIMARY_FIELD: &str = "command";

/// The console reports results through an inline script assigning `message`
static RESULT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var message = '(.*?)';").expect("Invalid regex pattern")
});

const NO_MESSAGE: &str = "No message found";

#[derive(Debug, Clone, Default)]
pub struct AdminCommandBuilder;

impl JobBuilder for AdminCommandBuilder {
    fn build(&self, record: &Record, ctx: &BuildContext<'_>) -> Result<DispatchJob, RecordError> {
        let command = record.field(PRIMARY_FIELD).unwrap_or_default();
        let enterprise = ctx
            .config
            .require("ENTERPRISE")
            .map_err(|e| RecordError::Internal(e.to_string()))?;

        Ok(DispatchJob {
            row: record.index(),
            key: command.to_string(),
            endpoint: Endpoint::new(ENDPOINT)
                .with_query("sidEnterprise", encoded_enterprise_sid(enterprise)),
            payload: FormPayload::new().with("sCommandList", command),
        })
    }

    fn describe_success(&self, _job: &DispatchJob, response: &TransportResponse) -> String {
        extract_console_message(&response.body).unwrap_or_else(|| NO_MESSAGE.to_string())
    }
}

/// Pull the result message out of the console's response page
pub fn extract_console_message(html: &str) -> Option<String> {
    html.split("<script")
        .skip(1)
        .filter(|script| script.contains("displayWindow('Results', message);"))
        .find_map(|script| RESULT_MESSAGE.captures(script))
        .map(|caps| caps[1].replace("\\n", "\n"))
}
