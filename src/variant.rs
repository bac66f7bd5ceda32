//! Run variants
//!
//! Each variant fixes the required configuration keys, the primary (sentinel)
//! field, the job builder and the name of the status column written back.

use crate::job::{
    admin_command, price_sheet, status_message, sys_config, AdminCommandBuilder, JobBuilder,
    PriceSheetBuilder, StatusMessageBuilder, SysConfigBuilder,
};
use crate::mapping::MappingColumns;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Update cost price sheets
    PriceSheet,
    /// Post status messages to transport orders
    StatusMessage,
    /// Update enterprise system-configuration settings
    SysConfig,
    /// Run admin console commands
    AdminCommand,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::PriceSheet,
        Variant::StatusMessage,
        Variant::SysConfig,
        Variant::AdminCommand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::PriceSheet => "price-sheet",
            Variant::StatusMessage => "status-message",
            Variant::SysConfig => "sys-config",
            Variant::AdminCommand => "admin-command",
        }
    }

    /// Configuration keys required on top of `PRIMARY_SERVER` and `AUTH_COOKIE`
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Variant::PriceSheet => &["TRANSPORT_ORDER_SUFFIX"],
            Variant::StatusMessage => &[
                "ENTERPRISE_OID",
                "EVENT_SUFFIX",
                "STATUS_MESSAGE",
                "TRANSPORT_ORDER_SUFFIX",
                "SCAC",
            ],
            Variant::SysConfig | Variant::AdminCommand => &["ENTERPRISE"],
        }
    }

    /// Field whose first blank value marks the end of input
    pub fn primary_field(&self) -> &'static str {
        match self {
            Variant::PriceSheet => price_sheet::PRIMARY_FIELD,
            Variant::StatusMessage => status_message::PRIMARY_FIELD,
            Variant::SysConfig => sys_config::PRIMARY_FIELD,
            Variant::AdminCommand => admin_command::PRIMARY_FIELD,
        }
    }

    /// Config key holding the suffix applied to resolved identifiers
    pub fn suffix_key(&self) -> Option<&'static str> {
        match self {
            Variant::PriceSheet | Variant::StatusMessage => Some("TRANSPORT_ORDER_SUFFIX"),
            Variant::SysConfig | Variant::AdminCommand => None,
        }
    }

    pub fn mapping_columns(&self) -> MappingColumns {
        MappingColumns::transport()
    }

    /// Column the outcome strings are written to
    pub fn status_column(&self) -> &'static str {
        match self {
            Variant::AdminCommand => "Result",
            _ => "Status",
        }
    }

    pub fn default_call_timeout(&self) -> Duration {
        match self {
            Variant::SysConfig => Duration::from_secs(15),
            _ => Duration::from_secs(10),
        }
    }

    pub fn builder(&self) -> Arc<dyn JobBuilder> {
        match self {
            Variant::PriceSheet => Arc::new(PriceSheetBuilder),
            Variant::StatusMessage => Arc::new(StatusMessageBuilder),
            Variant::SysConfig => Arc::new(SysConfigBuilder),
            Variant::AdminCommand => Arc::new(AdminCommandBuilder),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
