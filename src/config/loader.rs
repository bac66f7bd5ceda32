//! Key/value configuration loading
//!
//! The configuration file is a headerless two-column CSV: column A holds the
//! key, column B the value. Rows where either cell is blank are skipped, extra
//! columns are ignored.

use super::Settings;
use crate::Result;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a file and apply environment overrides
    pub fn load(path: &Path) -> Result<Settings> {
        let file = std::fs::File::open(path)?;
        let mut settings = Self::from_reader(file)?;
        settings.merge_env();
        debug!(
            "Loaded {} config keys from {}",
            settings.len(),
            path.display()
        );
        Ok(settings)
    }

    /// Parse settings from any reader without touching the environment
    pub fn from_reader<R: Read>(reader: R) -> Result<Settings> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut settings = Settings::new();
        for row in csv_reader.records() {
            let row = row?;
            match (row.get(0), row.get(1)) {
                (Some(key), Some(value)) if !key.is_empty() && !value.is_empty() => {
                    settings.insert(key, value);
                }
                _ => continue,
            }
        }
        Ok(settings)
    }
}
