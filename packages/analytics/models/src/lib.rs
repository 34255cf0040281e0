#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived row types for the metric, growth, and candidate views.
//!
//! Every ratio is an `Option<f64>`: `None` means the denominator was zero
//! and the value is undefined, which consumers must treat as missing rather
//! than as `0.0`. Rows are flat so each view can be written as CSV.

use corridor_census_models::ModeCategory;
use serde::{Deserialize, Serialize};

/// Divides `numerator` by `denominator`, or `None` when the denominator is
/// zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// Share of one mode category among an area-year's informative commuters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeShareRow {
    /// Census year.
    pub year: u16,
    /// Residence area code.
    pub area_code: String,
    /// Residence area name.
    pub area_name: String,
    /// Mode category.
    pub category: ModeCategory,
    /// Commuters in this category.
    pub commuters: u64,
    /// Informative commuters across all categories.
    pub total_commuters: u64,
    /// `commuters / total_commuters`.
    pub share: Option<f64>,
}

/// A single-ratio metric for one area-year (WFH, mixed-mode, or
/// self-containment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRateRow {
    /// Census year.
    pub year: u16,
    /// Area code.
    pub area_code: String,
    /// Area name.
    pub area_name: String,
    /// Numerator count.
    pub numerator: u64,
    /// Denominator count.
    pub denominator: u64,
    /// `numerator / denominator`.
    pub rate: Option<f64>,
}

/// CBD-bound commuter volume and dependency for one origin-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbdDependencyRow {
    /// Census year.
    pub year: u16,
    /// Origin area code.
    pub origin_code: String,
    /// Origin area name.
    pub origin_name: String,
    /// Commuters whose workplace lies in the CBD proxy region.
    pub cbd_commuters: u64,
    /// Analysis-ready commuters leaving the origin.
    pub total_commuters: u64,
    /// `cbd_commuters / total_commuters`.
    pub dependency_rate: Option<f64>,
}

/// Jurisdiction-wide commuters and share of one category in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTrendRow {
    /// Census year.
    pub year: u16,
    /// Mode category.
    pub category: ModeCategory,
    /// Commuters in this category.
    pub commuters: u64,
    /// Informative commuters in the year.
    pub total_commuters: u64,
    /// `commuters / total_commuters`.
    pub share: Option<f64>,
}

/// Change in CBD commuting for one origin between the baseline and target
/// years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbdGrowthRow {
    /// Origin area code.
    pub origin_code: String,
    /// Origin area name (target year).
    pub origin_name: String,
    /// Baseline year.
    pub baseline_year: u16,
    /// Target year.
    pub target_year: u16,
    /// Baseline CBD commuters, when the origin existed then.
    pub baseline_cbd_commuters: Option<u64>,
    /// Target CBD commuters.
    pub target_cbd_commuters: u64,
    /// Baseline dependency rate.
    pub baseline_dependency_rate: Option<f64>,
    /// Target dependency rate.
    pub target_dependency_rate: Option<f64>,
    /// `target - baseline` CBD commuters.
    pub commuter_change: Option<i64>,
    /// `target - baseline` dependency rate.
    pub dependency_rate_change: Option<f64>,
    /// `(target - baseline) / baseline`, defined only for a positive
    /// baseline.
    pub growth_rate: Option<f64>,
}

/// One scored origin on the bus candidate shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusCandidate {
    /// 1-based position on the shortlist.
    pub rank: usize,
    /// Scored year.
    pub year: u16,
    /// Origin area code.
    pub origin_code: String,
    /// Origin area name.
    pub origin_name: String,
    /// Commuters to the CBD proxy region.
    pub cbd_commuters: u64,
    /// Analysis-ready commuters leaving the origin.
    pub total_commuters: u64,
    /// Growth rate used for scoring; undefined growth is scored as `0.0`.
    pub growth_rate: f64,
    /// Public-transport share.
    pub pt_share: f64,
    /// Work-from-home share.
    pub wfh_share: f64,
    /// Mixed public/private share.
    pub mixed_share: f64,
    /// `cbd_commuters / max(cbd_commuters)`.
    pub cbd_volume_component: f64,
    /// `max(growth_rate, 0) / max(growth_rate)`, or `0.0` when the maximum
    /// is not positive.
    pub growth_component: f64,
    /// `1 - pt_share`.
    pub pt_gap_component: f64,
    /// `1 - wfh_share`.
    pub wfh_gap_component: f64,
    /// `mixed_share / max(mixed_share)`.
    pub mixed_mode_component: f64,
    /// Weighted sum of the five components.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_undefined_for_zero_denominator() {
        assert_eq!(ratio(0, 0), None);
        assert_eq!(ratio(5, 0), None);
        assert_eq!(ratio(0, 4), Some(0.0));
        assert_eq!(ratio(1, 4), Some(0.25));
    }

    #[test]
    fn undefined_share_serializes_as_null() {
        let row = ModeShareRow {
            year: 2021,
            area_code: "1".to_string(),
            area_name: "Parramatta".to_string(),
            category: ModeCategory::Wfh,
            commuters: 0,
            total_commuters: 0,
            share: None,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["category"], "WFH");
        assert!(value["share"].is_null());
    }
}
