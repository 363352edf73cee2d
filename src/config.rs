use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::DEFAULT_DELIMITER;

/// Dashboard settings, read from an optional JSON file.
///
/// Every field has a default, so a partial file such as
/// `{ "data_path": "Data/bank-additional-full.csv" }` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened at start-up.
    pub data_path: Option<PathBuf>,
    /// Field separator for delimited text.
    pub delimiter: char,
    /// Rows shown in the raw-data preview.
    pub preview_rows: usize,
    /// Initial window size in logical points.
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            delimiter: char::from(DEFAULT_DELIMITER),
            preview_rows: 5,
            window_size: [1400.0, 900.0],
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.delimiter_byte()?;
        Ok(config)
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter '{}' is not a single ASCII character", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }
}
