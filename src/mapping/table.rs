//! External id → internal id lookup table

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Column names of the delimited mapping source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingColumns {
    pub external: String,
    pub internal: String,
}

impl MappingColumns {
    pub fn new(external: impl Into<String>, internal: impl Into<String>) -> Self {
        Self {
            external: external.into(),
            internal: internal.into(),
        }
    }

    /// Columns used by the transport order exports
    pub fn transport() -> Self {
        Self::new("transport_id", "transport_order_id")
    }
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self::new("external_id", "internal_id")
    }
}

/// Read-only lookup from an external identifier to a base internal identifier
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_string(), v.into().trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { entries }
    }

    /// Load a headered CSV mapping file
    ///
    /// A missing or unreadable file yields an empty table; the caller treats
    /// that as "no mapping available".
    pub fn load(path: &Path, columns: &MappingColumns) -> Self {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Error reading mapping file {}: {}", path.display(), e);
                return Self::empty();
            }
        };

        match Self::from_reader(file, columns) {
            Ok(table) => {
                info!(
                    "Loaded mapping for {} ids from {}",
                    table.len(),
                    path.display()
                );
                table
            }
            Err(e) => {
                warn!("Error reading mapping file {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Parse a headered CSV; rows missing either column are skipped
    pub fn from_reader<R: Read>(reader: R, columns: &MappingColumns) -> csv::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let external_idx = headers.iter().position(|h| h == columns.external);
        let internal_idx = headers.iter().position(|h| h == columns.internal);

        let (Some(external_idx), Some(internal_idx)) = (external_idx, internal_idx) else {
            warn!(
                "Mapping source lacks '{}' or '{}' column",
                columns.external, columns.internal
            );
            return Ok(Self::empty());
        };

        let mut entries = HashMap::new();
        for row in csv_reader.records() {
            let row = row?;
            if let (Some(external), Some(internal)) = (row.get(external_idx), row.get(internal_idx))
            {
                if !external.is_empty() && !internal.is_empty() {
                    entries.insert(external.to_string(), internal.to_string());
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, external_id: &str) -> Option<&str> {
        self.entries.get(external_id.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
