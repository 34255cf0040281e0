//! Unmatched-key diagnostics.
//!
//! Summarizes every raw area label that failed to resolve, with the number
//! of rows and commuters it affected, so that data-quality gaps are visible
//! without ever aborting a run.

use std::collections::BTreeMap;

use corridor_census_models::{FlowRecord, RawModeCount};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which side of an origin-destination row a label came from.
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
pub enum FlowSide {
    /// Place of usual residence.
    Residence,
    /// Place of work.
    Workplace,
}

/// A residence label from the mode table that matched no area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedTransportArea {
    /// Census year.
    pub year: u16,
    /// Label as published.
    pub raw_label: String,
    /// Number of affected rows.
    pub rows: u64,
    /// Commuters on the affected rows.
    pub commuters: u64,
}

/// A residence or workplace label from the flow table that matched no area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedFlowArea {
    /// Census year.
    pub year: u16,
    /// Side the label came from.
    pub side: FlowSide,
    /// Label as published.
    pub raw_label: String,
    /// Number of affected rows.
    pub rows: u64,
    /// Commuters on the affected rows.
    pub commuters: u64,
}

/// Groups unmatched mode-table rows by `(year, label)`.
#[must_use]
pub fn unmatched_transport_areas(unmatched: &[RawModeCount]) -> Vec<UnmatchedTransportArea> {
    let mut groups: BTreeMap<(u16, &str), (u64, u64)> = BTreeMap::new();
    for row in unmatched {
        let entry = groups.entry((row.year, row.area_label.as_str())).or_default();
        entry.0 += 1;
        entry.1 += row.commuters;
    }

    let out: Vec<UnmatchedTransportArea> = groups
        .into_iter()
        .map(|((year, label), (rows, commuters))| UnmatchedTransportArea {
            year,
            raw_label: label.to_string(),
            rows,
            commuters,
        })
        .collect();

    if !out.is_empty() {
        let commuters: u64 = out.iter().map(|u| u.commuters).sum();
        log::warn!(
            "{} transport labels did not resolve ({commuters} commuters)",
            out.len()
        );
    }

    out
}

/// Groups the unresolved sides of clean flow rows by
/// `(year, side, label)`. A row unresolved on both sides is counted once
/// per side.
#[must_use]
pub fn unmatched_flow_areas(clean: &[FlowRecord]) -> Vec<UnmatchedFlowArea> {
    let mut groups: BTreeMap<(u16, FlowSide, &str), (u64, u64)> = BTreeMap::new();
    for record in clean {
        let sides = [
            (
                FlowSide::Residence,
                record.residence_code.is_none(),
                record.residence_label.as_str(),
            ),
            (
                FlowSide::Workplace,
                record.workplace_code.is_none(),
                record.workplace_label.as_str(),
            ),
        ];
        for (side, unresolved, label) in sides {
            if unresolved {
                let entry = groups.entry((record.year, side, label)).or_default();
                entry.0 += 1;
                entry.1 += record.commuters;
            }
        }
    }

    let out: Vec<UnmatchedFlowArea> = groups
        .into_iter()
        .map(|((year, side, label), (rows, commuters))| UnmatchedFlowArea {
            year,
            side,
            raw_label: label.to_string(),
            rows,
            commuters,
        })
        .collect();

    if !out.is_empty() {
        let commuters: u64 = out.iter().map(|u| u.commuters).sum();
        log::warn!(
            "{} flow labels did not resolve ({commuters} commuter-sides)",
            out.len()
        );
    }

    out
}
