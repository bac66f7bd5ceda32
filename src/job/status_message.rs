//! Status-message posting against transport orders

use super::pickup::parse_pickup_date;
use super::{required, BuildContext, DispatchJob, JobBuilder};
use crate::dispatch::{Endpoint, FormPayload};
use crate::error::RecordError;
use crate::mapping::format_event_sid;
use crate::source::Record;

pub const ENDPOINT: &str = "/MercuryGate/transport/addMessage_process.jsp";

pub const PRIMARY_FIELD: &str = "Shipping Order";
pub const EXTERNAL_ID_FIELD: &str = "SO Oid";
pub const DIRECT_ID_FIELD: &str = "transport_order_id";
pub const EVENT_FIELD: &str = "Event Oid";
pub const PICKUP_FIELD: &str = "Pickup Date";

const DEFAULT_PICKUP_TIME: &str = "12:00 PM";
const DEFAULT_REFERENCE_TYPE_SID: &str = "(100106,3250,0)";

#[derive(Debug, Clone, Default)]
pub struct StatusMessageBuilder;

impl JobBuilder for StatusMessageBuilder {
    fn build(&self, record: &Record, ctx: &BuildContext<'_>) -> Result<DispatchJob, RecordError> {
        let key = record.field(PRIMARY_FIELD).unwrap_or_default();
        let config = ctx.config;

        let transport_order =
            ctx.resolver
                .resolve_record(record, key, EXTERNAL_ID_FIELD, DIRECT_ID_FIELD)?;
        let event_oid = required(record, key, EVENT_FIELD)?;
        let event_suffix = config
            .require("EVENT_SUFFIX")
            .map_err(|e| RecordError::Internal(e.to_string()))?;
        let pickup_date = parse_pickup_date(record.field(PICKUP_FIELD).unwrap_or_default());

        let text = |name: &str| config.get(name).unwrap_or_default().to_string();

        let payload = FormPayload::new()
            .with("norefresh", "")
            .with("bRefresh", "false")
            .with("oidEnterprise", text("ENTERPRISE_OID"))
            .with("bShowReferences", "true")
            .with("sidTransportOrder", transport_order)
            .with("sidEvent", format_event_sid(event_oid, event_suffix))
            .with("requireApproval", "false")
            .with("changeRequestType", "")
            .with("changeRequestOwnerOid", "")
            .with("sEvent", "")
            .with("sOrigApptComment", "")
            .with("SCAC", text("SCAC"))
            .with("PRO", key)
            .with("sType", text("STATUS_MESSAGE"))
            .with("dateDate1", "")
            .with("dateTime1", "")
            .with("dateDate2", pickup_date)
            .with("dateTime2", config.get_or("PICKUP_TIME", DEFAULT_PICKUP_TIME))
            .with("sLateReasonCode", "")
            .with(
                "sidReferenceType1",
                config.get_or("REFERENCE_TYPE_SID", DEFAULT_REFERENCE_TYPE_SID),
            )
            .with("sReference1", "");

        Ok(DispatchJob {
            row: record.index(),
            key: key.to_string(),
            endpoint: Endpoint::new(ENDPOINT),
            payload,
        })
    }
}
