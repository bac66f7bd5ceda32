//! Headered CSV record source

use super::{Record, RecordSource, RowIndex};
use crate::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<R>,
    headers: Arc<[String]>,
    next_index: usize,
}

impl CsvRecordSource<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers: Arc<[String]> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            reader,
            headers,
            next_index: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn column_name(&self, idx: usize) -> String {
        self.headers
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("column {}", idx + 1))
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut row = csv::ByteRecord::new();
        if !self.reader.read_byte_record(&mut row)? {
            return Ok(None);
        }

        let index = RowIndex(self.next_index);
        self.next_index += 1;

        let mut invalid_field = None;
        let values = row
            .iter()
            .enumerate()
            .map(|(i, cell)| match std::str::from_utf8(cell) {
                Ok(value) => value.to_string(),
                Err(_) => {
                    if invalid_field.is_none() {
                        invalid_field = Some(self.column_name(i));
                    }
                    String::from_utf8_lossy(cell).into_owned()
                }
            })
            .collect();

        let record = Record::new(index, self.headers.clone(), values);
        Ok(Some(match invalid_field {
            Some(field) => {
                warn!("Invalid UTF-8 in '{}' at {}", field, index);
                record.with_invalid_field(field)
            }
            None => record,
        }))
    }
}
