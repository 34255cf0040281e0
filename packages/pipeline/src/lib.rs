#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end commute corridor pipeline.
//!
//! Loads each census year's feeds, resolves geography, builds the transport
//! and flow facts, aggregates metrics, computes CBD growth, scores bus
//! candidates, and materializes every result as a named view.

pub mod output;
pub mod views;

use std::path::{Path, PathBuf};

use corridor_analytics::{ScoringInputs, metrics};
use corridor_analytics_models::{
    AreaRateRow, BusCandidate, CbdDependencyRow, CbdGrowthRow, ModeShareRow, ModeTrendRow,
};
use corridor_census_models::{Area, FlowRecord, RawFlowCount, RawModeCount, TransportRecord};
use corridor_config::{ConfigError, PipelineConfig};
use corridor_facts::audit::{
    UnmatchedFlowArea, UnmatchedTransportArea, unmatched_flow_areas, unmatched_transport_areas,
};
use corridor_facts::flow::{FlowFilter, analysis_view, build_flow_facts};
use corridor_facts::transport::{build_transport_facts, informative_view};
use corridor_geography::{AmbiguousAreaName, AreaDimension};
use corridor_source::feed_def::FeedDefinition;
use corridor_source::{LoadReport, SourceError, YearFeeds, load_year, registry};

use crate::output::{Manifest, OutputFormat, write_manifest, write_rows};
use crate::views::ViewName;

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Feed loading failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An output file could not be created or opened.
    #[error("Failed to write {path}: {source}")]
    Output {
        /// Output path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configured period year has no feed definition.
    #[error("No census feed is defined for configured year {year}")]
    MissingYear {
        /// Configured year.
        year: u16,
    },

    /// The output directory holds no manifest.
    #[error("No materialized views in {dir}; run the pipeline first")]
    NotMaterialized {
        /// Output directory.
        dir: String,
    },

    /// The view was not part of the last run's output.
    #[error("View '{view}' was not materialized in {dir}")]
    ViewNotMaterialized {
        /// Requested view.
        view: ViewName,
        /// Output directory.
        dir: String,
    },
}

/// Every view produced by one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutputs {
    /// Per-year load counts.
    pub load_reports: Vec<(u16, LoadReport)>,
    /// One row per `(year, code)` area.
    pub area_dim: Vec<Area>,
    /// Resolved mode counts.
    pub transport_fact_clean: Vec<TransportRecord>,
    /// Informative mode counts inside the jurisdiction.
    pub transport_fact_informative: Vec<TransportRecord>,
    /// Every flow row, with unresolved sides left empty.
    pub flow_fact_clean: Vec<FlowRecord>,
    /// Fully resolved, geographic, in-jurisdiction flows.
    pub flow_fact_analysis: Vec<FlowRecord>,
    /// Per-category share per area-year.
    pub mode_share: Vec<ModeShareRow>,
    /// Work-from-home rate per area-year.
    pub wfh_rate: Vec<AreaRateRow>,
    /// Mixed public/private rate per area-year.
    pub mixed_mode_rate: Vec<AreaRateRow>,
    /// Own-area workplace rate per origin-year.
    pub self_containment: Vec<AreaRateRow>,
    /// CBD volume and dependency per origin-year.
    pub cbd_dependency: Vec<CbdDependencyRow>,
    /// Jurisdiction-wide category shares per year.
    pub mode_trend: Vec<ModeTrendRow>,
    /// CBD growth into the target year per origin.
    pub cbd_growth: Vec<CbdGrowthRow>,
    /// Ranked target-year shortlist.
    pub bus_candidates: Vec<BusCandidate>,
    /// Unresolved mode-table residence labels.
    pub unmatched_transport_areas: Vec<UnmatchedTransportArea>,
    /// Unresolved flow labels, per side.
    pub unmatched_flow_areas: Vec<UnmatchedFlowArea>,
    /// Codes whose name key is owned by another code.
    pub ambiguous_area_names: Vec<AmbiguousAreaName>,
}

impl PipelineOutputs {
    /// Number of rows in `view`.
    #[must_use]
    pub fn row_count(&self, view: ViewName) -> usize {
        match view {
            ViewName::AreaDim => self.area_dim.len(),
            ViewName::TransportFactClean => self.transport_fact_clean.len(),
            ViewName::TransportFactInformative => self.transport_fact_informative.len(),
            ViewName::FlowFactClean => self.flow_fact_clean.len(),
            ViewName::FlowFactAnalysis => self.flow_fact_analysis.len(),
            ViewName::ModeShare => self.mode_share.len(),
            ViewName::WfhRate => self.wfh_rate.len(),
            ViewName::MixedModeRate => self.mixed_mode_rate.len(),
            ViewName::SelfContainment => self.self_containment.len(),
            ViewName::CbdDependency => self.cbd_dependency.len(),
            ViewName::ModeTrend => self.mode_trend.len(),
            ViewName::CbdGrowth => self.cbd_growth.len(),
            ViewName::BusCandidates => self.bus_candidates.len(),
            ViewName::UnmatchedTransportAreas => self.unmatched_transport_areas.len(),
            ViewName::UnmatchedFlowAreas => self.unmatched_flow_areas.len(),
            ViewName::AmbiguousAreaNames => self.ambiguous_area_names.len(),
        }
    }

    /// Writes `view` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the view cannot be written.
    pub fn write_view(
        &self,
        dir: &Path,
        view: ViewName,
        format: OutputFormat,
    ) -> Result<output::ManifestEntry, PipelineError> {
        match view {
            ViewName::AreaDim => write_rows(dir, view, format, &self.area_dim),
            ViewName::TransportFactClean => write_rows(dir, view, format, &self.transport_fact_clean),
            ViewName::TransportFactInformative => {
                write_rows(dir, view, format, &self.transport_fact_informative)
            }
            ViewName::FlowFactClean => write_rows(dir, view, format, &self.flow_fact_clean),
            ViewName::FlowFactAnalysis => write_rows(dir, view, format, &self.flow_fact_analysis),
            ViewName::ModeShare => write_rows(dir, view, format, &self.mode_share),
            ViewName::WfhRate => write_rows(dir, view, format, &self.wfh_rate),
            ViewName::MixedModeRate => write_rows(dir, view, format, &self.mixed_mode_rate),
            ViewName::SelfContainment => write_rows(dir, view, format, &self.self_containment),
            ViewName::CbdDependency => write_rows(dir, view, format, &self.cbd_dependency),
            ViewName::ModeTrend => write_rows(dir, view, format, &self.mode_trend),
            ViewName::CbdGrowth => write_rows(dir, view, format, &self.cbd_growth),
            ViewName::BusCandidates => write_rows(dir, view, format, &self.bus_candidates),
            ViewName::UnmatchedTransportAreas => {
                write_rows(dir, view, format, &self.unmatched_transport_areas)
            }
            ViewName::UnmatchedFlowAreas => {
                write_rows(dir, view, format, &self.unmatched_flow_areas)
            }
            ViewName::AmbiguousAreaNames => {
                write_rows(dir, view, format, &self.ambiguous_area_names)
            }
        }
    }
}

/// Headline counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Census years loaded.
    pub years: usize,
    /// Areas across all years.
    pub areas: usize,
    /// Count rows dropped as malformed.
    pub malformed_rows: usize,
    /// Commuters on mode rows whose residence did not resolve.
    pub unmatched_transport_commuters: u64,
    /// Commuters on flow rows with an unresolved side, counted per side.
    pub unmatched_flow_commuters: u64,
    /// Area codes that lost their name key to another code.
    pub ambiguous_names: usize,
    /// Origins on the candidate shortlist.
    pub candidates: usize,
}

impl RunSummary {
    /// Summarizes `outputs`.
    #[must_use]
    pub fn from_outputs(outputs: &PipelineOutputs) -> Self {
        Self {
            years: outputs.load_reports.len(),
            areas: outputs.area_dim.len(),
            malformed_rows: outputs
                .load_reports
                .iter()
                .map(|(_, r)| r.malformed_rows)
                .sum(),
            unmatched_transport_commuters: outputs
                .unmatched_transport_areas
                .iter()
                .map(|u| u.commuters)
                .sum(),
            unmatched_flow_commuters: outputs
                .unmatched_flow_areas
                .iter()
                .map(|u| u.commuters)
                .sum(),
            ambiguous_names: outputs.ambiguous_area_names.len(),
            candidates: outputs.bus_candidates.len(),
        }
    }

    /// Logs the summary at info level.
    pub fn log(&self) {
        log::info!(
            "Run complete: {} years, {} areas, {} malformed rows, {} ambiguous names",
            self.years,
            self.areas,
            self.malformed_rows,
            self.ambiguous_names
        );
        log::info!(
            "Unmatched commuters: {} transport, {} flow; {} bus candidates",
            self.unmatched_transport_commuters,
            self.unmatched_flow_commuters,
            self.candidates
        );
    }
}

/// Runs every stage over already-loaded census years.
#[must_use]
pub fn compute(config: &PipelineConfig, years: &[YearFeeds]) -> PipelineOutputs {
    let filters = &config.filters;

    let dimension = AreaDimension::resolve(years.iter().map(|y| y.areas.as_slice()));

    let mode_counts: Vec<RawModeCount> = years
        .iter()
        .flat_map(|y| y.mode_counts.iter().cloned())
        .collect();
    let flow_counts: Vec<RawFlowCount> = years
        .iter()
        .flat_map(|y| y.flow_counts.iter().cloned())
        .collect();

    let transport = build_transport_facts(&dimension, &mode_counts);
    let transport_fact_informative = informative_view(&transport.clean, &filters.jurisdiction);

    let flow_fact_clean = build_flow_facts(&dimension, &flow_counts);
    let flow_fact_analysis = analysis_view(
        &flow_fact_clean,
        &FlowFilter {
            jurisdiction: &filters.jurisdiction,
            reserved_workplace_codes: &filters.reserved_workplace_codes,
        },
    );

    let unmatched_transport_areas = unmatched_transport_areas(&transport.unmatched);
    let unmatched_flow_areas = unmatched_flow_areas(&flow_fact_clean);

    let mode_share = metrics::mode_share(&transport_fact_informative);
    let wfh_rate = metrics::wfh_rate(&mode_share);
    let mixed_mode_rate = metrics::mixed_mode_rate(&mode_share);
    let self_containment = metrics::self_containment(&flow_fact_analysis);
    let cbd_dependency = metrics::cbd_dependency(
        &flow_fact_analysis,
        &filters.cbd_region,
        filters.cbd_region_level,
    );
    let mode_trend = metrics::mode_trend(&transport_fact_informative);

    let cbd_growth = corridor_analytics::cbd_growth(&cbd_dependency, &config.periods);
    let bus_candidates = corridor_analytics::score_candidates(
        &ScoringInputs {
            dependency: &cbd_dependency,
            shares: &mode_share,
            growth: &cbd_growth,
        },
        config.periods.target_year,
        &config.eligibility,
        &config.weights,
    );

    PipelineOutputs {
        load_reports: years.iter().map(|y| (y.year, y.report)).collect(),
        ambiguous_area_names: dimension.ambiguous_names().to_vec(),
        area_dim: dimension.areas().to_vec(),
        transport_fact_clean: transport.clean,
        transport_fact_informative,
        flow_fact_clean,
        flow_fact_analysis,
        mode_share,
        wfh_rate,
        mixed_mode_rate,
        self_containment,
        cbd_dependency,
        mode_trend,
        cbd_growth,
        bus_candidates,
        unmatched_transport_areas,
        unmatched_flow_areas,
    }
}

/// Checks that both configured years have a feed definition.
///
/// # Errors
///
/// Returns [`PipelineError::MissingYear`] for the first year without one.
pub fn check_periods(config: &PipelineConfig, feeds: &[FeedDefinition]) -> Result<(), PipelineError> {
    for year in [config.periods.baseline_year, config.periods.target_year] {
        if !feeds.iter().any(|f| f.year == year) {
            return Err(PipelineError::MissingYear { year });
        }
    }
    Ok(())
}

/// Returns the feed definitions from `feeds_dir`, or the embedded set.
///
/// # Errors
///
/// Returns [`PipelineError::Source`] if a definition is malformed.
pub fn feed_definitions(feeds_dir: Option<&Path>) -> Result<Vec<FeedDefinition>, PipelineError> {
    Ok(match feeds_dir {
        Some(dir) => registry::feeds_from_dir(dir)?,
        None => registry::embedded_feeds()?,
    })
}

/// Options for [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding every year's input files.
    pub input_dir: PathBuf,
    /// Directory of feed definition TOMLs replacing the embedded set.
    pub feeds_dir: Option<PathBuf>,
    /// Directory views are written to.
    pub output_dir: PathBuf,
    /// File format of the views.
    pub format: OutputFormat,
    /// Views to write; empty means all.
    pub views: Vec<ViewName>,
}

/// Loads, computes, and materializes the pipeline.
///
/// # Errors
///
/// Returns [`PipelineError`] if a feed cannot be loaded, a configured year
/// has no feed, or a view cannot be written.
pub fn run(config: &PipelineConfig, options: &RunOptions) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    let feeds = feed_definitions(options.feeds_dir.as_deref())?;
    check_periods(config, &feeds)?;

    let years = feeds
        .iter()
        .map(|def| load_year(def, &options.input_dir))
        .collect::<Result<Vec<_>, _>>()?;

    let outputs = compute(config, &years);

    std::fs::create_dir_all(&options.output_dir).map_err(|source| PipelineError::Output {
        path: options.output_dir.display().to_string(),
        source,
    })?;

    let selected: &[ViewName] = if options.views.is_empty() {
        ViewName::all()
    } else {
        &options.views
    };

    let mut manifest = Manifest::new(config);
    for &view in selected {
        manifest
            .views
            .push(outputs.write_view(&options.output_dir, view, options.format)?);
    }
    let path = write_manifest(&options.output_dir, &manifest)?;
    log::info!("Wrote manifest {}", path.display());

    let summary = RunSummary::from_outputs(&outputs);
    summary.log();
    Ok(summary)
}
