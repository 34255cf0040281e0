#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Transport and origin-destination fact builders.
//!
//! Joins the adapted raw count rows to the [`AreaDimension`], classifies
//! travel modes, and derives the filtered analysis views. Rows that fail to
//! join are never errors: they stay in the clean layer or the unmatched
//! list and are summarized by the [`audit`] diagnostics.
//!
//! [`AreaDimension`]: corridor_geography::AreaDimension

pub mod audit;
pub mod flow;
pub mod transport;

use corridor_geography::normalize_name_key;

/// Returns `true` when `state` names the target jurisdiction.
///
/// Compared with the same case and edge-whitespace folding as area names.
#[must_use]
pub fn in_jurisdiction(state: Option<&str>, jurisdiction: &str) -> bool {
    state.is_some_and(|s| normalize_name_key(s) == normalize_name_key(jurisdiction))
}
