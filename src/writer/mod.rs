//! Result write-back
//!
//! Writers receive the finalized [`ResultSet`] and persist one human-readable
//! outcome string per row.

use crate::collector::ResultSet;
use crate::source::RowIndex;
use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub trait ResultWriter {
    fn write(&mut self, results: &ResultSet) -> Result<()>;
}

/// Output path next to the input: `orders.csv` → `orders_updated.csv`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{}_updated.{}", stem, ext.to_string_lossy()),
        None => format!("{stem}_updated"),
    };
    input.with_file_name(file_name)
}

/// Copies the input CSV to `output` with a status column filled in
///
/// The status column is reused if the header already has one, otherwise it
/// is appended. Rows without an outcome (the sentinel and everything after
/// it) are copied unchanged.
pub struct CsvResultWriter {
    input: PathBuf,
    output: PathBuf,
    status_column: String,
}

impl CsvResultWriter {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, status_column: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            status_column: status_column.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl ResultWriter for CsvResultWriter {
    fn write(&mut self, results: &ResultSet) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.input)?;

        // Write to a temp file next to the output, then rename over it, so the
        // input is fully read even when it is also the output.
        let dir = match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(temp.as_file_mut());

            let mut headers = reader.byte_headers()?.clone();
            let status_idx = match headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim() == self.status_column)
            {
                Some(idx) => idx,
                None => {
                    headers.push_field(self.status_column.as_bytes());
                    headers.len() - 1
                }
            };
            writer.write_byte_record(&headers)?;

            // Rows are copied as raw bytes; only the status cell is replaced.
            let mut row = csv::ByteRecord::new();
            let mut i = 0;
            while reader.read_byte_record(&mut row)? {
                match results.get(RowIndex(i)) {
                    Some(outcome) => {
                        let status = outcome.to_string();
                        let mut values: Vec<&[u8]> = row.iter().collect();
                        if values.len() <= status_idx {
                            values.resize(status_idx + 1, &[]);
                        }
                        values[status_idx] = status.as_bytes();
                        writer.write_record(&values)?;
                    }
                    None => writer.write_byte_record(&row)?,
                }
                i += 1;
            }
            writer.flush()?;
        }
        temp.persist(&self.output).map_err(|e| e.error)?;

        info!(
            "Wrote {} outcomes to {}",
            results.len(),
            self.output.display()
        );
        Ok(())
    }
}

/// Keeps written lines in memory, in row order
#[derive(Debug, Default)]
pub struct MemoryResultWriter {
    pub lines: Vec<(RowIndex, String)>,
}

impl ResultWriter for MemoryResultWriter {
    fn write(&mut self, results: &ResultSet) -> Result<()> {
        self.lines = results
            .iter()
            .map(|(row, outcome)| (row, outcome.to_string()))
            .collect();
        Ok(())
    }
}
