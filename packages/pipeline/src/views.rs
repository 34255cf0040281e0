//! Named output views.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Every table the pipeline materializes, addressable by name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViewName {
    /// Unified area dimension.
    AreaDim,
    /// Mode counts whose residence label resolved.
    TransportFactClean,
    /// Informative, in-jurisdiction mode counts.
    TransportFactInformative,
    /// Every origin-destination row with both sides looked up.
    FlowFactClean,
    /// Analysis-ready origin-destination rows.
    FlowFactAnalysis,
    /// Commuter share per area-year and category.
    ModeShare,
    /// Work-from-home rate per area-year.
    WfhRate,
    /// Mixed public/private rate per area-year.
    MixedModeRate,
    /// Share of origin commuters working in their own area.
    SelfContainment,
    /// CBD-bound volume and dependency rate per origin-year.
    CbdDependency,
    /// Jurisdiction-wide category shares per year.
    ModeTrend,
    /// Baseline to target CBD growth per origin.
    CbdGrowth,
    /// Ranked bus corridor shortlist.
    BusCandidates,
    /// Mode-table labels with no area match.
    UnmatchedTransportAreas,
    /// Flow-table labels with no area match, per side.
    UnmatchedFlowAreas,
    /// Area codes that lost their name key to another code.
    AmbiguousAreaNames,
}

impl ViewName {
    /// Returns all variants of this enum, in dependency order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AreaDim,
            Self::TransportFactClean,
            Self::TransportFactInformative,
            Self::FlowFactClean,
            Self::FlowFactAnalysis,
            Self::ModeShare,
            Self::WfhRate,
            Self::MixedModeRate,
            Self::SelfContainment,
            Self::CbdDependency,
            Self::ModeTrend,
            Self::CbdGrowth,
            Self::BusCandidates,
            Self::UnmatchedTransportAreas,
            Self::UnmatchedFlowAreas,
            Self::AmbiguousAreaNames,
        ]
    }

    /// One-line description of the view's rows.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AreaDim => "One row per (year, SA2 area) across all census years",
            Self::TransportFactClean => "Mode counts joined to their residence area",
            Self::TransportFactInformative => {
                "Informative mode counts inside the jurisdiction"
            }
            Self::FlowFactClean => "All origin-destination rows, resolved or not",
            Self::FlowFactAnalysis => {
                "Fully resolved, geographic, in-jurisdiction origin-destination rows"
            }
            Self::ModeShare => "Per-category commuter share per area-year",
            Self::WfhRate => "Work-from-home rate per area-year",
            Self::MixedModeRate => "Mixed public/private rate per area-year",
            Self::SelfContainment => "Share of commuters working in their own area",
            Self::CbdDependency => "CBD-bound commuter volume and rate per origin-year",
            Self::ModeTrend => "Jurisdiction-wide mode share per year",
            Self::CbdGrowth => "CBD commuter change from baseline to target year",
            Self::BusCandidates => "Ranked bus corridor candidates with score components",
            Self::UnmatchedTransportAreas => "Mode-table labels that matched no area",
            Self::UnmatchedFlowAreas => "Flow-table labels that matched no area",
            Self::AmbiguousAreaNames => "Area codes sharing a name key within a year",
        }
    }
}
