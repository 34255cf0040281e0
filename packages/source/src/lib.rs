#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census feed loading and travel-mode classification.
//!
//! Each census year publishes its area, mode-of-travel, and
//! origin-destination tables with its own column names. A
//! [`feed_def::FeedDefinition`] describes one year's files, and
//! [`load_year`] adapts them into the canonical raw record shapes from
//! `corridor_census_models`.

pub mod csv_feed;
pub mod feed_def;
pub mod mode_mapping;
pub mod parsing;
pub mod registry;

use std::path::Path;

use corridor_census_models::{RawArea, RawFlowCount, RawModeCount};

use crate::csv_feed::{CsvTable, read_csv_file};
use crate::feed_def::FeedDefinition;

/// Errors that can occur while loading census feeds.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A feed file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A feed definition TOML could not be parsed.
    #[error("Invalid feed definition {name}: {message}")]
    FeedDefinition {
        /// Feed definition name or path.
        name: String,
        /// Parse error description.
        message: String,
    },

    /// A column named by the feed definition is absent from the file.
    #[error("[{feed}] missing column '{column}'")]
    MissingColumn {
        /// Feed label.
        feed: String,
        /// Missing column name.
        column: String,
    },

    /// Data normalization error.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of what went wrong.
        message: String,
    },
}

/// Row counts gathered while adapting one census year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Area rows read.
    pub area_rows: usize,
    /// Mode-count rows kept.
    pub mode_rows: usize,
    /// Origin-destination rows kept.
    pub flow_rows: usize,
    /// Count rows dropped because the count was malformed.
    pub malformed_rows: usize,
}

/// One census year's raw tables adapted into canonical shapes.
#[derive(Debug, Clone, Default)]
pub struct YearFeeds {
    /// Census year.
    pub year: u16,
    /// Area rows.
    pub areas: Vec<RawArea>,
    /// Residence-by-mode counts.
    pub mode_counts: Vec<RawModeCount>,
    /// Residence-by-workplace counts.
    pub flow_counts: Vec<RawFlowCount>,
    /// Row counts.
    pub report: LoadReport,
}

/// Reads one census year's three files from `input_dir` and adapts them.
///
/// # Errors
///
/// Returns [`SourceError`] if a file cannot be read or lacks a mapped
/// column. Malformed count rows are skipped and logged, not returned as
/// errors.
pub fn load_year(def: &FeedDefinition, input_dir: &Path) -> Result<YearFeeds, SourceError> {
    let delimiter = def.delimiter_byte();
    log::info!("[{}] Loading feeds from {}", def.name, input_dir.display());

    let areas = read_csv_file(
        &input_dir.join(&def.area.file),
        delimiter,
        &def.label("areas"),
    )?;
    let modes = read_csv_file(
        &input_dir.join(&def.transport.file),
        delimiter,
        &def.label("transport"),
    )?;
    let flows = read_csv_file(
        &input_dir.join(&def.flow.file),
        delimiter,
        &def.label("flow"),
    )?;

    adapt_year(def, &areas, &modes, &flows)
}

/// Adapts already-parsed tables for one census year.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if a table lacks a column named
/// by the feed definition.
pub fn adapt_year(
    def: &FeedDefinition,
    areas: &CsvTable,
    modes: &CsvTable,
    flows: &CsvTable,
) -> Result<YearFeeds, SourceError> {
    let area_label = def.label("areas");
    let transport_label = def.label("transport");
    let flow_label = def.label("flow");

    areas.require_columns(&area_label, &def.area.required_columns())?;
    modes.require_columns(&transport_label, &def.transport.required_columns())?;
    flows.require_columns(&flow_label, &def.flow.required_columns())?;

    let mut report = LoadReport::default();

    let areas: Vec<RawArea> = areas
        .records
        .iter()
        .map(|record| def.area.adapt(def.year, record))
        .collect();
    report.area_rows = areas.len();

    let mut mode_counts = Vec::with_capacity(modes.records.len());
    for (i, record) in modes.records.iter().enumerate() {
        if let Some(row) = def.transport.adapt(def.year, record) {
            mode_counts.push(row);
        } else {
            log::warn!("[{transport_label}] row {}: malformed count, skipping", i + 2);
            report.malformed_rows += 1;
        }
    }
    report.mode_rows = mode_counts.len();

    let mut flow_counts = Vec::with_capacity(flows.records.len());
    for (i, record) in flows.records.iter().enumerate() {
        if let Some(row) = def.flow.adapt(def.year, record) {
            flow_counts.push(row);
        } else {
            log::warn!("[{flow_label}] row {}: malformed count, skipping", i + 2);
            report.malformed_rows += 1;
        }
    }
    report.flow_rows = flow_counts.len();

    log::info!(
        "[{}] {} areas, {} mode rows, {} flow rows ({} malformed)",
        def.name,
        report.area_rows,
        report.mode_rows,
        report.flow_rows,
        report.malformed_rows
    );

    Ok(YearFeeds {
        year: def.year,
        areas,
        mode_counts,
        flow_counts,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_feed::read_csv;
    use crate::registry::embedded_feeds;

    fn table(text: &str) -> CsvTable {
        read_csv(text.as_bytes(), b',', "test").unwrap()
    }

    #[test]
    fn adapts_latest_year_tables() {
        let feeds = embedded_feeds().unwrap();
        let def = feeds.iter().find(|f| f.year == 2021).unwrap();

        let areas = table(
            "SA2_CODE21,SA2_NAME21,SA3_NAME21,SA4_NAME21,GCC_NAME21,STE_NAME21,AREASQKM21,CHG_FLAG21,CHG_LBL21\n\
             117031644,Sydney (North) - Millers Point,Sydney Inner City,Sydney - City and Inner South,Greater Sydney,New South Wales,1.2,1,New\n",
        );
        let modes = table(
            "SA2 (UR),MTWP Method of Travel to Work by Main Mode,Count\n\
             Parramatta,Train,120\n\
             Parramatta,Bus,oops\n",
        );
        let flows = table(
            "SA2 (UR),SA2 (POW),Count\n\
             Parramatta,Sydney (North) - Millers Point,40\n",
        );

        let year = adapt_year(def, &areas, &modes, &flows).unwrap();
        assert_eq!(year.year, 2021);
        assert_eq!(year.areas[0].change_flag, Some(1));
        assert_eq!(year.areas[0].change_label.as_deref(), Some("New"));
        assert_eq!(year.mode_counts.len(), 1);
        assert_eq!(year.flow_counts[0].commuters, 40);
        assert_eq!(
            year.report,
            LoadReport {
                area_rows: 1,
                mode_rows: 1,
                flow_rows: 1,
                malformed_rows: 1,
            }
        );
    }

    #[test]
    fn rejects_table_missing_mapped_column() {
        let feeds = embedded_feeds().unwrap();
        let def = feeds.iter().find(|f| f.year == 2016).unwrap();

        let areas = table("SA2_MAIN16,SA2_NAME16\n1,A\n");
        let modes = table("SA2 (UR),MTWP Method of Travel to Work,Count\nA,Train,1\n");
        let flows = table("SA2 (UR),POW_SA2_16,Count\nA,A,1\n");

        let err = adapt_year(def, &areas, &modes, &flows).unwrap_err();
        assert!(matches!(
            err,
            SourceError::MissingColumn { ref column, .. } if column == "SA3_NAME16"
        ));
    }
}
