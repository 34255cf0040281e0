//! CSV table reader for census feeds.
//!
//! Parses a CSV file and returns every row as a [`serde_json::Value`]
//! object keyed by the column headers in the first row, so that per-year
//! adapters can address columns by their published names.

use std::io::Read;
use std::path::Path;

use crate::SourceError;

/// A parsed CSV table.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    /// Trimmed column headers in file order.
    pub headers: Vec<String>,
    /// One JSON object per data row.
    pub records: Vec<serde_json::Value>,
}

impl CsvTable {
    /// Verifies that every column in `columns` is present.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingColumn`] for the first absent column.
    pub fn require_columns(&self, label: &str, columns: &[&str]) -> Result<(), SourceError> {
        for column in columns {
            if !self.headers.iter().any(|h| h == column) {
                return Err(SourceError::MissingColumn {
                    feed: label.to_string(),
                    column: (*column).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parses CSV text from any reader.
///
/// # Errors
///
/// Returns [`SourceError`] if the CSV cannot be parsed or has no header row.
pub fn read_csv<R: Read>(reader: R, delimiter: u8, label: &str) -> Result<CsvTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Normalization {
            message: format!("[{label}] CSV file contains no header row"),
        });
    }

    let mut records: Vec<serde_json::Value> = Vec::new();

    for result in reader.records() {
        let record = result?;

        let mut map = serde_json::Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("").trim().to_owned();
            map.insert(header.clone(), serde_json::Value::String(value));
        }
        records.push(serde_json::Value::Object(map));
    }

    log::debug!("[{label}] parsed {} rows", records.len());

    Ok(CsvTable { headers, records })
}

/// Opens and parses a CSV file.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or parsed.
pub fn read_csv_file(path: &Path, delimiter: u8, label: &str) -> Result<CsvTable, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Open {
        path: path.display().to_string(),
        source: e,
    })?;
    read_csv(std::io::BufReader::new(file), delimiter, label)
}
