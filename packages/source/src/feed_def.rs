//! Config-driven census feed definition.
//!
//! [`FeedDefinition`] captures everything that differs between census years
//! (file names and the published column names for semantically identical
//! fields) in a serializable config struct. A single generic adapter maps
//! each year's rows into the canonical raw record shapes, so no shared logic
//! ever branches on the year.

use corridor_census_models::{AreaSize, RawArea, RawFlowCount, RawModeCount};
use serde::{Deserialize, Serialize};

use crate::parsing::{get_non_empty, get_str, parse_count, parse_f64, parse_flag};

// ── Top-level feed definition ────────────────────────────────────────────

/// The complete set of input tables for one census year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDefinition {
    /// Census year (e.g., `2016`).
    pub year: u16,
    /// Human-readable name (e.g., `"Census 2016"`).
    pub name: String,
    /// Field delimiter shared by the year's files (default: comma).
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Area (SA2 dimension) table.
    pub area: AreaFeed,
    /// Residence-by-mode-of-travel count table.
    pub transport: TransportFeed,
    /// Residence-by-workplace count table.
    pub flow: FlowFeed,
}

impl FeedDefinition {
    /// Returns the delimiter byte for this year's files.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter
            .as_deref()
            .and_then(|d| d.as_bytes().first().copied())
            .unwrap_or(b',')
    }

    /// Label used in log messages for one of this year's tables.
    #[must_use]
    pub fn label(&self, table: &str) -> String {
        format!("{} {table}", self.year)
    }
}

// ── Area table ───────────────────────────────────────────────────────────

/// Column mapping for a year's area table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaFeed {
    /// File name relative to the input directory.
    pub file: String,
    /// Area code column.
    pub code: String,
    /// Area name column.
    pub name: String,
    /// Parent SA3 name column.
    pub sa3_name: Option<String>,
    /// Parent SA4 name column.
    pub sa4_name: Option<String>,
    /// Greater capital city name column.
    pub gccsa_name: Option<String>,
    /// State name column.
    pub state_name: Option<String>,
    /// Area size column and unit.
    pub size: Option<SizeField>,
    /// Boundary change flag column (latest year only).
    pub change_flag: Option<String>,
    /// Boundary change label column (latest year only).
    pub change_label: Option<String>,
}

/// Unit in which a feed publishes area size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    /// Square kilometres.
    SquareKilometres,
    /// Square metres.
    SquareMetres,
}

/// An area size column and its unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeField {
    /// Column name.
    pub field: String,
    /// Published unit.
    pub unit: SizeUnit,
}

impl SizeField {
    fn extract(&self, record: &serde_json::Value) -> Option<AreaSize> {
        let value = get_str(record, &self.field).and_then(parse_f64)?;
        Some(match self.unit {
            SizeUnit::SquareKilometres => AreaSize::SquareKilometres(value),
            SizeUnit::SquareMetres => AreaSize::SquareMetres(value),
        })
    }
}

impl AreaFeed {
    /// Columns that must exist in the file.
    #[must_use]
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.code.as_str(), self.name.as_str()];
        columns.extend(
            [
                self.sa3_name.as_deref(),
                self.sa4_name.as_deref(),
                self.gccsa_name.as_deref(),
                self.state_name.as_deref(),
                self.size.as_ref().map(|s| s.field.as_str()),
                self.change_flag.as_deref(),
                self.change_label.as_deref(),
            ]
            .into_iter()
            .flatten(),
        );
        columns
    }

    /// Adapts one raw area row. Malformed rows pass through with whatever
    /// fields could be read.
    #[must_use]
    pub fn adapt(&self, year: u16, record: &serde_json::Value) -> RawArea {
        let optional = |field: Option<&String>| field.and_then(|f| get_non_empty(record, f));

        RawArea {
            year,
            code: get_str(record, &self.code).unwrap_or_default().to_string(),
            name: record
                .get(&self.name)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            sa3_name: optional(self.sa3_name.as_ref()),
            sa4_name: optional(self.sa4_name.as_ref()),
            gccsa_name: optional(self.gccsa_name.as_ref()),
            state_name: optional(self.state_name.as_ref()),
            size: self.size.as_ref().and_then(|s| s.extract(record)),
            change_flag: self
                .change_flag
                .as_ref()
                .and_then(|f| get_str(record, f))
                .and_then(parse_flag),
            change_label: optional(self.change_label.as_ref()),
        }
    }
}

// ── Transport table ──────────────────────────────────────────────────────

/// Column mapping for a year's residence-by-mode table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportFeed {
    /// File name relative to the input directory.
    pub file: String,
    /// Residence area name column.
    pub area: String,
    /// Travel mode label column.
    pub mode: String,
    /// Commuter count column.
    pub count: String,
}

impl TransportFeed {
    /// Columns that must exist in the file.
    #[must_use]
    pub fn required_columns(&self) -> Vec<&str> {
        vec![self.area.as_str(), self.mode.as_str(), self.count.as_str()]
    }

    /// Adapts one raw mode-count row, returning `None` when the count is
    /// malformed.
    #[must_use]
    pub fn adapt(&self, year: u16, record: &serde_json::Value) -> Option<RawModeCount> {
        let commuters = get_str(record, &self.count).and_then(parse_count)?;
        Some(RawModeCount {
            year,
            area_label: raw_label(record, &self.area),
            mode_label: get_str(record, &self.mode).unwrap_or_default().to_string(),
            commuters,
        })
    }
}

// ── Flow table ───────────────────────────────────────────────────────────

/// Column mapping for a year's residence-by-workplace table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowFeed {
    /// File name relative to the input directory.
    pub file: String,
    /// Residence area name column.
    pub residence: String,
    /// Workplace area name column.
    pub workplace: String,
    /// Commuter count column.
    pub count: String,
}

impl FlowFeed {
    /// Columns that must exist in the file.
    #[must_use]
    pub fn required_columns(&self) -> Vec<&str> {
        vec![
            self.residence.as_str(),
            self.workplace.as_str(),
            self.count.as_str(),
        ]
    }

    /// Adapts one raw origin-destination row, returning `None` when the
    /// count is malformed.
    #[must_use]
    pub fn adapt(&self, year: u16, record: &serde_json::Value) -> Option<RawFlowCount> {
        let commuters = get_str(record, &self.count).and_then(parse_count)?;
        Some(RawFlowCount {
            year,
            residence_label: raw_label(record, &self.residence),
            workplace_label: raw_label(record, &self.workplace),
            commuters,
        })
    }
}

/// Area labels are kept verbatim; normalization belongs to the geography
/// resolver.
fn raw_label(record: &serde_json::Value, field: &str) -> String {
    record
        .get(field)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Parses a [`FeedDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_feed_toml(toml_str: &str) -> Result<FeedDefinition, toml::de::Error> {
    toml::de::from_str(toml_str)
}
