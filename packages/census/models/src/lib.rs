#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census geography, commute-mode, and origin-destination record types.
//!
//! This crate defines the canonical record shapes that every census year is
//! adapted into before any shared logic runs. All records are flat so they
//! can be materialized directly as CSV rows.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Fixed taxonomy of commute-mode categories.
///
/// Every raw travel-mode label maps to exactly one of these.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeCategory {
    /// Bus, train, ferry, tram, or light rail without a private vehicle leg
    PublicTransport,
    /// Car, truck, motorbike, scooter, or taxi
    PrivateVehicle,
    /// Worked at home
    Wfh,
    /// A trip combining public transport with a private vehicle leg
    MixedPtPrivate,
    /// Walked only or bicycle
    ActiveTransport,
    /// A recognised trip that fits no other category
    Other,
    /// Not stated, not applicable, or did not go to work
    NonInformative,
}

impl ModeCategory {
    /// Returns `true` when the category describes an actual travel behavior.
    #[must_use]
    pub const fn is_informative(self) -> bool {
        !matches!(self, Self::NonInformative)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PublicTransport,
            Self::PrivateVehicle,
            Self::Wfh,
            Self::MixedPtPrivate,
            Self::ActiveTransport,
            Self::Other,
            Self::NonInformative,
        ]
    }

    /// Returns the categories that count toward mode-share denominators.
    #[must_use]
    pub fn informative() -> Vec<Self> {
        Self::all()
            .iter()
            .copied()
            .filter(|c| c.is_informative())
            .collect()
    }
}

/// Aggregation level of the statistical geography hierarchy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegionLevel {
    /// Statistical Area Level 3
    Sa3,
    /// Statistical Area Level 4
    Sa4,
    /// Greater capital city statistical area
    Gccsa,
}

/// Area size as published by a year's feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum AreaSize {
    /// Already converted to square kilometres.
    SquareKilometres(f64),
    /// Raw square metres.
    SquareMetres(f64),
}

/// One area row adapted from a year-specific feed, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArea {
    /// Census year of the feed.
    pub year: u16,
    /// Area code.
    pub code: String,
    /// Display name as published.
    pub name: String,
    /// Parent SA3 name.
    pub sa3_name: Option<String>,
    /// Parent SA4 name.
    pub sa4_name: Option<String>,
    /// Parent greater capital city name.
    pub gccsa_name: Option<String>,
    /// State or territory name.
    pub state_name: Option<String>,
    /// Area size in the feed's native unit.
    pub size: Option<AreaSize>,
    /// Boundary change flag, when the feed publishes one.
    pub change_flag: Option<i32>,
    /// Boundary change label, when the feed publishes one.
    pub change_label: Option<String>,
}

/// One residence-by-mode-of-travel count row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModeCount {
    /// Census year of the feed.
    pub year: u16,
    /// Residence area name as published.
    pub area_label: String,
    /// Free-text travel mode label.
    pub mode_label: String,
    /// Number of commuters.
    pub commuters: u64,
}

/// One residence-by-workplace count row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlowCount {
    /// Census year of the feed.
    pub year: u16,
    /// Residence area name as published.
    pub residence_label: String,
    /// Workplace area name as published.
    pub workplace_label: String,
    /// Number of commuters.
    pub commuters: u64,
}

/// One SA2 area for one census year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Census year the boundary belongs to.
    pub year: u16,
    /// Area code, unique within the year.
    pub code: String,
    /// Display name as published.
    pub name: String,
    /// Case- and edge-whitespace-folded join key.
    pub name_key: String,
    /// Parent SA3 name.
    pub sa3_name: Option<String>,
    /// Parent SA4 name.
    pub sa4_name: Option<String>,
    /// Parent greater capital city name.
    pub gccsa_name: Option<String>,
    /// State or territory name.
    pub state_name: Option<String>,
    /// Area in square kilometres.
    pub area_sq_km: Option<f64>,
    /// Boundary change flag. Only published for the latest year.
    pub change_flag: Option<i32>,
    /// Boundary change label. Only published for the latest year.
    pub change_label: Option<String>,
}

impl Area {
    /// Returns the parent region name at the given level.
    #[must_use]
    pub fn region_name(&self, level: RegionLevel) -> Option<&str> {
        match level {
            RegionLevel::Sa3 => self.sa3_name.as_deref(),
            RegionLevel::Sa4 => self.sa4_name.as_deref(),
            RegionLevel::Gccsa => self.gccsa_name.as_deref(),
        }
    }
}

/// One (year, residence area, mode label) observation joined to geography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportRecord {
    /// Census year.
    pub year: u16,
    /// Resolved residence area code.
    pub area_code: String,
    /// Resolved residence area name.
    pub area_name: String,
    /// Parent SA3 name of the residence area.
    pub sa3_name: Option<String>,
    /// Parent SA4 name of the residence area.
    pub sa4_name: Option<String>,
    /// Parent greater capital city name of the residence area.
    pub gccsa_name: Option<String>,
    /// State of the residence area.
    pub state_name: Option<String>,
    /// Trimmed raw mode label.
    pub mode_label: String,
    /// Classified mode category.
    pub category: ModeCategory,
    /// Whether the category describes an actual travel behavior.
    pub informative: bool,
    /// Number of commuters.
    pub commuters: u64,
}

/// One (year, residence, workplace) origin-destination observation.
///
/// The code/name columns of a side are `None` when that side's raw label
/// did not resolve to a known area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Census year.
    pub year: u16,
    /// Raw residence label as published.
    pub residence_label: String,
    /// Resolved residence area code.
    pub residence_code: Option<String>,
    /// Resolved residence area name.
    pub residence_name: Option<String>,
    /// Parent SA3 name of the residence area.
    pub residence_sa3_name: Option<String>,
    /// Parent SA4 name of the residence area.
    pub residence_sa4_name: Option<String>,
    /// Parent greater capital city name of the residence area.
    pub residence_gccsa_name: Option<String>,
    /// State of the residence area.
    pub residence_state_name: Option<String>,
    /// Boundary change flag of the residence area.
    pub residence_change_flag: Option<i32>,
    /// Boundary change label of the residence area.
    pub residence_change_label: Option<String>,
    /// Raw workplace label as published.
    pub workplace_label: String,
    /// Resolved workplace area code.
    pub workplace_code: Option<String>,
    /// Resolved workplace area name.
    pub workplace_name: Option<String>,
    /// Parent SA3 name of the workplace area.
    pub workplace_sa3_name: Option<String>,
    /// Parent SA4 name of the workplace area.
    pub workplace_sa4_name: Option<String>,
    /// Parent greater capital city name of the workplace area.
    pub workplace_gccsa_name: Option<String>,
    /// State of the workplace area.
    pub workplace_state_name: Option<String>,
    /// Boundary change flag of the workplace area.
    pub workplace_change_flag: Option<i32>,
    /// Boundary change label of the workplace area.
    pub workplace_change_label: Option<String>,
    /// Number of commuters.
    pub commuters: u64,
}

impl FlowRecord {
    /// Returns `true` when both the residence and workplace sides resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.residence_code.is_some() && self.workplace_code.is_some()
    }

    /// Returns the workplace parent region name at the given level.
    #[must_use]
    pub fn workplace_region_name(&self, level: RegionLevel) -> Option<&str> {
        match level {
            RegionLevel::Sa3 => self.workplace_sa3_name.as_deref(),
            RegionLevel::Sa4 => self.workplace_sa4_name.as_deref(),
            RegionLevel::Gccsa => self.workplace_gccsa_name.as_deref(),
        }
    }
}
