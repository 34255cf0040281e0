#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cross-year SA2 geography resolution.
//!
//! Normalizes each census year's adapted area rows into the canonical
//! [`Area`] shape and unions them into one [`AreaDimension`] that the fact
//! builders join against by `(year, name key)`.

pub mod dimension;

pub use dimension::{AmbiguousAreaName, AreaDimension};

use corridor_census_models::{Area, AreaSize, RawArea};

/// Conversion factor from square metres to square kilometres.
pub const SQ_M_TO_SQ_KM: f64 = 1e-6;

/// Folds an area name into its join key.
///
/// Uppercases and strips leading/trailing whitespace. Internal whitespace,
/// punctuation, and accents are left untouched, so `"St  Marys"` and
/// `"St Marys"` produce different keys.
#[must_use]
pub fn normalize_name_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Converts a feed-native area size to square kilometres.
#[must_use]
pub fn to_square_kilometres(size: AreaSize) -> f64 {
    match size {
        AreaSize::SquareKilometres(km) => km,
        AreaSize::SquareMetres(m) => m * SQ_M_TO_SQ_KM,
    }
}

/// Normalizes one adapted area row into the canonical [`Area`] shape.
#[must_use]
pub fn normalize_area(raw: &RawArea) -> Area {
    Area {
        year: raw.year,
        code: raw.code.trim().to_string(),
        name: raw.name.clone(),
        name_key: normalize_name_key(&raw.name),
        sa3_name: raw.sa3_name.clone(),
        sa4_name: raw.sa4_name.clone(),
        gccsa_name: raw.gccsa_name.clone(),
        state_name: raw.state_name.clone(),
        area_sq_km: raw.size.map(to_square_kilometres),
        change_flag: raw.change_flag,
        change_label: raw.change_label.clone(),
    }
}
