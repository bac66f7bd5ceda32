use super::format::format_composite_id;
use super::table::MappingTable;
use crate::error::RecordError;
use crate::source::Record;

/// Resolves record identifiers into composite target-system identifiers
#[derive(Debug, Clone, Default)]
pub struct IdentifierResolver {
    table: MappingTable,
    suffix: String,
}

impl IdentifierResolver {
    pub fn new(table: MappingTable, suffix: impl Into<String>) -> Self {
        Self {
            table,
            suffix: suffix.into(),
        }
    }

    pub fn has_mapping(&self) -> bool {
        !self.table.is_empty()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Look up an external id and format the mapped base value
    pub fn resolve(&self, external_id: &str) -> Result<String, RecordError> {
        self.table
            .get(external_id)
            .map(|base| format_composite_id(base, &self.suffix))
            .ok_or_else(|| RecordError::MappingNotFound {
                external_id: external_id.trim().to_string(),
            })
    }

    /// Format an identifier supplied directly by a record
    pub fn format_direct(&self, value: &str) -> String {
        format_composite_id(value.trim(), &self.suffix)
    }

    /// Resolve the identifier for a record
    ///
    /// With a non-empty table and an external id on the record the table is
    /// authoritative: a miss is `MappingNotFound`. Otherwise the record's
    /// direct field is formatted. A record with neither is a validation error
    /// on `external_field`.
    pub fn resolve_record(
        &self,
        record: &Record,
        key: &str,
        external_field: &str,
        direct_field: &str,
    ) -> Result<String, RecordError> {
        if self.has_mapping() {
            if let Some(external_id) = record.field(external_field) {
                return self.resolve(external_id);
            }
        }

        match record.field(direct_field) {
            Some(direct) => Ok(self.format_direct(direct)),
            None => Err(RecordError::missing_field(
                key,
                record.index(),
                external_field,
            )),
        }
    }
}
