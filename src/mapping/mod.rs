//! Identifier mapping
//!
//! Loads the external-id → internal-id table and formats resolved ids into the
//! target system's composite-identifier syntax.

pub mod format;
pub mod resolver;
pub mod table;

pub use format::{
    encoded_enterprise_sid, enterprise_sid, format_composite_id, format_event_sid,
};
pub use resolver::IdentifierResolver;
pub use table::{MappingColumns, MappingTable};
