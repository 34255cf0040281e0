//! View materialization.
//!
//! Each view is written to its own file in the output directory, as CSV or
//! as a pretty-printed JSON array. A `manifest.json` beside them records
//! which views were written, their row counts, and the effective config of
//! the run, so a view can be read back later without recomputing it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use corridor_config::PipelineConfig;
use corridor_source::csv_feed::read_csv;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::PipelineError;
use crate::views::ViewName;

/// Name of the manifest file inside an output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// File format of materialized views.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// Pretty-printed JSON array of objects.
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// One materialized view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// View name.
    pub view: ViewName,
    /// File name relative to the output directory.
    pub file: String,
    /// File format.
    pub format: OutputFormat,
    /// Number of data rows.
    pub rows: usize,
}

/// Index of an output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Version of the tool that wrote the views.
    pub version: String,
    /// Effective configuration of the run.
    pub config: PipelineConfig,
    /// Views written, in dependency order.
    pub views: Vec<ManifestEntry>,
}

impl Manifest {
    /// Starts an empty manifest for a run with `config`.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: config.clone(),
            views: Vec::new(),
        }
    }

    /// Looks up a view's entry.
    #[must_use]
    pub fn entry(&self, view: ViewName) -> Option<&ManifestEntry> {
        self.views.iter().find(|e| e.view == view)
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, PipelineError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| PipelineError::Output {
            path: path.display().to_string(),
            source,
        })
}

/// Writes `rows` as the file for `view` in `dir`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be created or a row cannot
/// be serialized.
pub fn write_rows<T: Serialize>(
    dir: &Path,
    view: ViewName,
    format: OutputFormat,
    rows: &[T],
) -> Result<ManifestEntry, PipelineError> {
    let file = format!("{view}.{}", format.extension());
    let path = dir.join(&file);
    let mut writer = create(&path)?;

    match format {
        OutputFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            for row in rows {
                csv.serialize(row)?;
            }
            csv.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rows)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }

    log::info!("Wrote {view}: {} rows to {}", rows.len(), path.display());

    Ok(ManifestEntry {
        view,
        file,
        format,
        rows: rows.len(),
    })
}

/// Writes `manifest` into `dir`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be written.
pub fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<PathBuf, PipelineError> {
    let path = dir.join(MANIFEST_FILE);
    let mut writer = create(&path)?;
    serde_json::to_writer_pretty(&mut writer, manifest)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(path)
}

/// Reads the manifest of an output directory.
///
/// # Errors
///
/// Returns [`PipelineError::NotMaterialized`] if `dir` holds no manifest.
pub fn read_manifest(dir: &Path) -> Result<Manifest, PipelineError> {
    let path = dir.join(MANIFEST_FILE);
    let file = File::open(&path).map_err(|_| PipelineError::NotMaterialized {
        dir: dir.display().to_string(),
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// A materialized view read back as text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewTable {
    /// Column names.
    pub headers: Vec<String>,
    /// Cell text per row; undefined values are empty.
    pub rows: Vec<Vec<String>>,
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn table_from_records(headers: Vec<String>, records: &[serde_json::Value]) -> ViewTable {
    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|h| record.get(h).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    ViewTable { headers, rows }
}

/// Reads a previously materialized view from `dir`.
///
/// # Errors
///
/// Returns [`PipelineError`] if `dir` has no manifest, the view was not
/// written, or its file cannot be parsed.
pub fn read_view(dir: &Path, view: ViewName) -> Result<ViewTable, PipelineError> {
    let manifest = read_manifest(dir)?;
    let entry = manifest
        .entry(view)
        .ok_or_else(|| PipelineError::ViewNotMaterialized {
            view,
            dir: dir.display().to_string(),
        })?;

    if entry.rows == 0 {
        return Ok(ViewTable::default());
    }

    let path = dir.join(&entry.file);
    let file = File::open(&path).map_err(|source| PipelineError::Output {
        path: path.display().to_string(),
        source,
    })?;

    match entry.format {
        OutputFormat::Csv => {
            let table = read_csv(BufReader::new(file), b',', view.as_ref())?;
            Ok(table_from_records(table.headers, &table.records))
        }
        OutputFormat::Json => {
            let records: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))?;
            let headers = records
                .first()
                .and_then(serde_json::Value::as_object)
                .map(|o| o.keys().cloned().collect())
                .unwrap_or_default();
            Ok(table_from_records(headers, &records))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        code: &'static str,
        rate: Option<f64>,
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "corridor_output_{name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                code: "1",
                rate: Some(0.25),
            },
            Row {
                code: "2",
                rate: None,
            },
        ]
    }

    #[test]
    fn csv_view_reads_back_with_blank_undefined_cells() {
        let dir = scratch_dir("csv");
        let mut manifest = Manifest::new(&PipelineConfig::default());
        manifest
            .views
            .push(write_rows(&dir, ViewName::WfhRate, OutputFormat::Csv, &rows()).unwrap());
        write_manifest(&dir, &manifest).unwrap();

        let table = read_view(&dir, ViewName::WfhRate).unwrap();
        assert_eq!(table.headers, ["code", "rate"]);
        assert_eq!(table.rows, [vec!["1", "0.25"], vec!["2", ""]]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn json_view_reads_back_with_null_as_blank() {
        let dir = scratch_dir("json");
        let mut manifest = Manifest::new(&PipelineConfig::default());
        let entry = write_rows(&dir, ViewName::ModeShare, OutputFormat::Json, &rows()).unwrap();
        assert_eq!(entry.file, "mode_share.json");
        assert_eq!(entry.rows, 2);
        manifest.views.push(entry);
        write_manifest(&dir, &manifest).unwrap();

        let table = read_view(&dir, ViewName::ModeShare).unwrap();
        assert_eq!(table.headers, ["code", "rate"]);
        assert_eq!(table.rows[1], ["2", ""]);

        let back = read_manifest(&dir).unwrap();
        assert_eq!(back, manifest);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_view_and_missing_manifest_are_errors() {
        let dir = scratch_dir("missing");
        assert!(matches!(
            read_view(&dir, ViewName::AreaDim),
            Err(PipelineError::NotMaterialized { .. })
        ));

        write_manifest(&dir, &Manifest::new(&PipelineConfig::default())).unwrap();
        assert!(matches!(
            read_view(&dir, ViewName::AreaDim),
            Err(PipelineError::ViewNotMaterialized {
                view: ViewName::AreaDim,
                ..
            })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_view_reads_back_empty() {
        let dir = scratch_dir("empty");
        let mut manifest = Manifest::new(&PipelineConfig::default());
        manifest
            .views
            .push(write_rows::<Row>(&dir, ViewName::BusCandidates, OutputFormat::Csv, &[]).unwrap());
        write_manifest(&dir, &manifest).unwrap();
        assert_eq!(
            read_view(&dir, ViewName::BusCandidates).unwrap(),
            ViewTable::default()
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
