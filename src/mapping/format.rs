//! Composite identifier formatting
//!
//! Pure string functions; no dependency on the mapping table or configuration.

use url::form_urlencoded;

/// Separator inside a composite identifier tuple
pub const COMPOSITE_SEPARATOR: char = ',';

/// Type code the remote system uses for enterprise identifiers
const ENTERPRISE_TYPE_SUFFIX: &str = "3640,0";

/// Normalize a base or composite value into `(a,b,c)` form
///
/// A value without a separator is a bare id and gets the suffix appended
/// inside parentheses. A value with a separator is already composite and is
/// only wrapped if it is not yet parenthesized. Applying the function to its
/// own output returns the output unchanged, whatever the suffix.
pub fn format_composite_id(value: &str, suffix: &str) -> String {
    if is_wrapped(value) {
        value.to_string()
    } else if !value.contains(COMPOSITE_SEPARATOR) {
        format!("({value}{suffix})")
    } else if value.starts_with('(') {
        value.to_string()
    } else {
        format!("({value})")
    }
}

fn is_wrapped(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('(') && value.ends_with(')')
}

/// Event identifiers pair the event oid with a configured suffix
pub fn format_event_sid(event_oid: &str, event_suffix: &str) -> String {
    format!("({event_oid},{event_suffix})")
}

pub fn enterprise_sid(enterprise_oid: &str) -> String {
    format!("({enterprise_oid},{ENTERPRISE_TYPE_SUFFIX})")
}

/// Enterprise sid encoded for use in a query string or raw form body
pub fn encoded_enterprise_sid(enterprise_oid: &str) -> String {
    form_urlencoded::byte_serialize(enterprise_sid(enterprise_oid).as_bytes()).collect()
}
