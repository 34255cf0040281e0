//! Origin-destination fact builder.
//!
//! Resolves the residence and workplace labels of each raw flow
//! independently against the same year's areas. Every row lands in the
//! clean layer; only fully resolved, geographic, in-jurisdiction rows reach
//! the analysis view.

use corridor_census_models::{FlowRecord, RawFlowCount};
use corridor_geography::AreaDimension;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::in_jurisdiction;

/// Why a clean flow row is excluded from the analysis view.
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
pub enum FlowExclusion {
    /// The residence label did not resolve.
    UnresolvedResidence,
    /// The workplace label did not resolve.
    UnresolvedWorkplace,
    /// The workplace code is a reserved non-geographic code.
    ReservedWorkplace,
    /// The residence area lies outside the jurisdiction.
    OutsideJurisdiction,
}

/// Rules that decide which clean flows are analysis-ready.
#[derive(Debug, Clone, Copy)]
pub struct FlowFilter<'a> {
    /// Residence-side state name to keep.
    pub jurisdiction: &'a str,
    /// Workplace codes that do not denote a place.
    pub reserved_workplace_codes: &'a [String],
}

impl FlowFilter<'_> {
    /// Returns the first rule that excludes `record`, or `None` when the
    /// row is analysis-ready.
    #[must_use]
    pub fn exclusion(&self, record: &FlowRecord) -> Option<FlowExclusion> {
        if record.residence_code.is_none() {
            return Some(FlowExclusion::UnresolvedResidence);
        }
        let Some(workplace) = record.workplace_code.as_deref() else {
            return Some(FlowExclusion::UnresolvedWorkplace);
        };
        if self
            .reserved_workplace_codes
            .iter()
            .any(|code| code.trim() == workplace)
        {
            return Some(FlowExclusion::ReservedWorkplace);
        }
        if !in_jurisdiction(record.residence_state_name.as_deref(), self.jurisdiction) {
            return Some(FlowExclusion::OutsideJurisdiction);
        }
        None
    }
}

/// Joins both sides of every raw flow row. Unresolved sides are `None`.
#[must_use]
pub fn build_flow_facts(dimension: &AreaDimension, rows: &[RawFlowCount]) -> Vec<FlowRecord> {
    let clean: Vec<FlowRecord> = rows
        .iter()
        .map(|row| {
            let residence = dimension.lookup(row.year, &row.residence_label);
            let workplace = dimension.lookup(row.year, &row.workplace_label);

            FlowRecord {
                year: row.year,
                residence_label: row.residence_label.clone(),
                residence_code: residence.map(|a| a.code.clone()),
                residence_name: residence.map(|a| a.name.clone()),
                residence_sa3_name: residence.and_then(|a| a.sa3_name.clone()),
                residence_sa4_name: residence.and_then(|a| a.sa4_name.clone()),
                residence_gccsa_name: residence.and_then(|a| a.gccsa_name.clone()),
                residence_state_name: residence.and_then(|a| a.state_name.clone()),
                residence_change_flag: residence.and_then(|a| a.change_flag),
                residence_change_label: residence.and_then(|a| a.change_label.clone()),
                workplace_label: row.workplace_label.clone(),
                workplace_code: workplace.map(|a| a.code.clone()),
                workplace_name: workplace.map(|a| a.name.clone()),
                workplace_sa3_name: workplace.and_then(|a| a.sa3_name.clone()),
                workplace_sa4_name: workplace.and_then(|a| a.sa4_name.clone()),
                workplace_gccsa_name: workplace.and_then(|a| a.gccsa_name.clone()),
                workplace_state_name: workplace.and_then(|a| a.state_name.clone()),
                workplace_change_flag: workplace.and_then(|a| a.change_flag),
                workplace_change_label: workplace.and_then(|a| a.change_label.clone()),
                commuters: row.commuters,
            }
        })
        .collect();

    let resolved = clean.iter().filter(|r| r.is_resolved()).count();
    log::info!(
        "Flow facts: {} rows, {resolved} resolved on both sides",
        clean.len()
    );

    clean
}

/// Restricts clean flows to analysis-ready rows.
#[must_use]
pub fn analysis_view(clean: &[FlowRecord], filter: &FlowFilter<'_>) -> Vec<FlowRecord> {
    let mut excluded = [0usize; 4];
    let mut kept = Vec::with_capacity(clean.len());

    for record in clean {
        match filter.exclusion(record) {
            None => kept.push(record.clone()),
            Some(reason) => excluded[reason as usize] += 1,
        }
    }

    log::info!(
        "Flow analysis view: {} kept; excluded {} unresolved residence, {} unresolved workplace, {} reserved workplace, {} outside jurisdiction",
        kept.len(),
        excluded[FlowExclusion::UnresolvedResidence as usize],
        excluded[FlowExclusion::UnresolvedWorkplace as usize],
        excluded[FlowExclusion::ReservedWorkplace as usize],
        excluded[FlowExclusion::OutsideJurisdiction as usize],
    );

    kept
}
