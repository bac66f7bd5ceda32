//! Record source adapter
//!
//! The engine consumes records through [`RecordSource`], one at a time and in
//! input order, and stops at the first sentinel record (see
//! [`read_until_sentinel`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub mod csv_source;

pub use csv_source::CsvRecordSource;

/// Zero-based position of a record among the data rows of the input
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RowIndex(pub usize);

impl RowIndex {
    /// Row number as shown in a spreadsheet, with the header on row 1
    pub fn sheet_row(self) -> usize {
        self.0 + 2
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.sheet_row())
    }
}

/// One input row: field names shared with every other row, plus raw values
#[derive(Debug, Clone)]
pub struct Record {
    index: RowIndex,
    headers: Arc<[String]>,
    values: Vec<String>,
    invalid_field: Option<String>,
}

impl Record {
    pub fn new(index: RowIndex, headers: Arc<[String]>, values: Vec<String>) -> Self {
        Self {
            index,
            headers,
            values,
            invalid_field: None,
        }
    }

    /// Mark `field` as not decodable from the input
    pub fn with_invalid_field(mut self, field: impl Into<String>) -> Self {
        self.invalid_field = Some(field.into());
        self
    }

    /// First field whose raw input was not valid UTF-8
    pub fn invalid_field(&self) -> Option<&str> {
        self.invalid_field.as_deref()
    }

    pub fn index(&self) -> RowIndex {
        self.index
    }

    /// Trimmed value of a field; absent and blank both read as `None`
    pub fn field(&self, name: &str) -> Option<&str> {
        self.raw(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Untrimmed value of a field
    pub fn raw(&self, name: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == name)?;
        self.values.get(idx).map(String::as_str)
    }
}

/// Ordered supplier of records
pub trait RecordSource {
    /// Next record in input order, or `None` at physical end of input
    fn next_record(&mut self) -> crate::Result<Option<Record>>;
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn next_record(&mut self) -> crate::Result<Option<Record>> {
        (**self).next_record()
    }
}

/// In-memory source, mostly for tests and dry runs
pub struct VecRecordSource {
    records: std::vec::IntoIter<Record>,
}

impl VecRecordSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }

    /// Build records from a header list and rows of values
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let headers: Arc<[String]> = headers.iter().map(|h| h.to_string()).collect();
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Record::new(
                    RowIndex(i),
                    headers.clone(),
                    row.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();
        Self::new(records)
    }
}

impl RecordSource for VecRecordSource {
    fn next_record(&mut self) -> crate::Result<Option<Record>> {
        Ok(self.records.next())
    }
}

/// Pull records until the first one whose `primary_field` is blank
///
/// The sentinel record is not returned and nothing after it is read.
pub fn read_until_sentinel<S: RecordSource + ?Sized>(
    source: &mut S,
    primary_field: &str,
) -> crate::Result<Vec<Record>> {
    let mut records = Vec::new();
    while let Some(record) = source.next_record()? {
        if record.field(primary_field).is_none() {
            info!(
                "Empty '{}' at {}. Stopping processing.",
                primary_field,
                record.index()
            );
            break;
        }
        records.push(record);
    }
    Ok(records)
}
