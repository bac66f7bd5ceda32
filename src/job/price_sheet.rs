//! Cost price-sheet updates

use super::{required, BuildContext, DispatchJob, JobBuilder};
use crate::collector::Outcome;
use crate::config::RunConfig;
use crate::dispatch::{Endpoint, FormPayload, TransportResponse};
use crate::error::RecordError;
use crate::source::Record;

pub const ENDPOINT: &str = "/MercuryGate/pricesheets/editPriceSheet_process.jsp";

pub const PRIMARY_FIELD: &str = "pri_ref";
pub const COST_FIELD: &str = "OTM_COST";
pub const PRICE_SHEET_FIELD: &str = "pricesheet_is";
pub const EXTERNAL_ID_FIELD: &str = "transport_id";
pub const DIRECT_ID_FIELD: &str = "transport_order_id";

/// Charge lines of a cost sheet: (type, description, EDI code, rate qualifier)
const CHARGE_LINES: &[(&str, &str, &str, &str)] = &[
    ("ITEM", "Total Line Haul", "", "FR"),
    ("DISCOUNT", "Discount", "DSC", "FR"),
    ("ACCESSORIAL_FUEL", "Fuel Surcharge", "FUE", "FR"),
    ("ACCESSORIAL", "", "LFA", "FR"),
    ("ACCESSORIAL", "", "LFA", "FR"),
    ("ACCESSORIAL", "", "LFA", "FR"),
    ("ACCESSORIAL_PERCENTAGE_TOTAL", "", "TAX:PST", "PCT"),
];

/// Deployment constants; each can be overridden by the config key in parentheses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSheetDefaults {
    /// Owning enterprise (`LIST_OWNER_OID`)
    pub list_owner_oid: String,
    /// Carrier sid (`CARRIER_SID`)
    pub carrier_sid: String,
    /// Carrier mode (`CARRIER_MODE`)
    pub carrier_mode: String,
    /// Carrier service (`CARRIER_SERVICE`)
    pub carrier_service: String,
    /// Currency (`CURRENCY_CODE`)
    pub currency_code: String,
}

impl Default for PriceSheetDefaults {
    fn default() -> Self {
        Self {
            list_owner_oid: "4554639789".to_string(),
            carrier_sid: "(4533774089,3840,0)".to_string(),
            carrier_mode: "TL".to_string(),
            carrier_service: "Standard".to_string(),
            currency_code: "EUR".to_string(),
        }
    }
}

impl PriceSheetDefaults {
    pub fn from_config(config: &RunConfig) -> Self {
        let base = Self::default();
        Self {
            list_owner_oid: config
                .get_or("LIST_OWNER_OID", &base.list_owner_oid)
                .to_string(),
            carrier_sid: config.get_or("CARRIER_SID", &base.carrier_sid).to_string(),
            carrier_mode: config.get_or("CARRIER_MODE", &base.carrier_mode).to_string(),
            carrier_service: config
                .get_or("CARRIER_SERVICE", &base.carrier_service)
                .to_string(),
            currency_code: config
                .get_or("CURRENCY_CODE", &base.currency_code)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceSheetBuilder;

impl JobBuilder for PriceSheetBuilder {
    fn build(&self, record: &Record, ctx: &BuildContext<'_>) -> Result<DispatchJob, RecordError> {
        let key = record.field(PRIMARY_FIELD).unwrap_or_default();
        let cost = required(record, key, COST_FIELD)?;
        let price_sheet_oid = required(record, key, PRICE_SHEET_FIELD)?;
        let transport_order =
            ctx.resolver
                .resolve_record(record, key, EXTERNAL_ID_FIELD, DIRECT_ID_FIELD)?;

        let defaults = PriceSheetDefaults::from_config(ctx.config);
        let mut payload = FormPayload::new()
            .with("sSheetType", "Cost")
            .with("listOwnerOids", defaults.list_owner_oid.as_str())
            .with(
                "sReturnURL",
                format!("/MercuryGate/transport/editTransportOrig.jsp?sidTransport={transport_order}"),
            )
            .with("sPostProcessURL", "")
            .with("oidPriceSheet", price_sheet_oid)
            .with("bGLWaiver", "false")
            .with("isVendor", "false")
            .with("sidCarrier", defaults.carrier_sid.as_str())
            .with("sCarrierMode", defaults.carrier_mode.as_str())
            .with("sCarrierService", defaults.carrier_service.as_str())
            .with("fCarrierServiceDays", "")
            .with("oidContract", "")
            .with("sCurrencyCode", defaults.currency_code.as_str())
            .with("oidCarrierLocation", "-1")
            .with("CostChargeModel", "NORMALIZED_MANUAL");

        for (i, (charge_type, desc, edi, rq)) in CHARGE_LINES.iter().enumerate() {
            let n = i + 1;
            let rate = if n == 1 { cost } else { "" };
            payload.set(format!("CostCharge{n}Type"), *charge_type);
            payload.set(format!("CostCharge{n}Desc"), *desc);
            payload.set(format!("CostCharge{n}EDICode"), *edi);
            payload.set(format!("CostCharge{n}Rate"), rate);
            payload.set(format!("CostCharge{n}RQ"), *rq);
        }
        payload.set("CostNumCharges", CHARGE_LINES.len().to_string());

        for field in [
            "sCommentsPS",
            "fDistance",
            "dateDate1",
            "dateTime1",
            "dateDate2",
            "dateTime2",
        ] {
            payload.set(field, "");
        }

        Ok(DispatchJob {
            row: record.index(),
            key: key.to_string(),
            endpoint: Endpoint::new(ENDPOINT),
            payload,
        })
    }

    fn describe_success(&self, job: &DispatchJob, _response: &TransportResponse) -> String {
        format!("SO {} OK", job.key)
    }

    fn describe_failure(&self, key: &str, err: RecordError) -> Outcome {
        Outcome::from(err).with_subject(format!("SO {key}"))
    }
}
