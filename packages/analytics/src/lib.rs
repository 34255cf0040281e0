#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Metric aggregation, CBD growth, and bus candidate scoring.
//!
//! All functions here are pure transformations of the fact views. The
//! stages run in order: [`metrics`] feeds [`growth`], and both feed
//! [`scoring`].

pub mod growth;
pub mod metrics;
pub mod scoring;

pub use growth::cbd_growth;
pub use metrics::{
    cbd_dependency, mixed_mode_rate, mode_share, mode_trend, self_containment, wfh_rate,
};
pub use scoring::{ScoringInputs, score_candidates};
