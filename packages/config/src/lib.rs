#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline configuration.
//!
//! Every tunable of the pipeline (jurisdiction, CBD proxy region, reserved
//! workplace codes, comparison years, eligibility thresholds, and the five
//! score weights) lives in one TOML document. A config is validated whenever
//! it is constructed from text, so an invalid config never reaches the
//! scorer.

use std::path::Path;

use corridor_census_models::RegionLevel;
use serde::{Deserialize, Serialize};

/// Default configuration, embedded at compile time.
pub const DEFAULT_TOML: &str = include_str!("../default.toml");

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization failed.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The score weights do not sum to 1.0.
    #[error("score weights must sum to 1.0, got {sum}")]
    WeightSum {
        /// Actual sum.
        sum: f64,
    },

    /// A score weight is negative or not finite.
    #[error("score weight '{name}' must be a finite non-negative number, got {value}")]
    InvalidWeight {
        /// Weight name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// An eligibility threshold is below zero.
    #[error("threshold '{name}' must not be negative, got {value}")]
    NegativeThreshold {
        /// Threshold name.
        name: &'static str,
        /// Offending value.
        value: i64,
    },

    /// A required text setting is blank.
    #[error("'{name}' must not be empty")]
    EmptyField {
        /// Setting name.
        name: &'static str,
    },

    /// The baseline year is not before the target year.
    #[error("baseline year {baseline} must be before target year {target}")]
    InvalidPeriods {
        /// Baseline year.
        baseline: u16,
        /// Target year.
        target: u16,
    },
}

/// Geographic filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Residence-side state name to restrict analysis to.
    pub jurisdiction: String,
    /// Name of the region standing in for the CBD.
    pub cbd_region: String,
    /// Hierarchy level `cbd_region` is matched against.
    pub cbd_region_level: RegionLevel,
    /// Workplace codes that denote no geographic place.
    pub reserved_workplace_codes: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            jurisdiction: "New South Wales".to_string(),
            cbd_region: "Sydney Inner City".to_string(),
            cbd_region_level: RegionLevel::Sa3,
            reserved_workplace_codes: vec!["199999499".to_string()],
        }
    }
}

/// The two census years compared for growth and the year scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeriodConfig {
    /// Earlier year of the growth comparison.
    pub baseline_year: u16,
    /// Later year of the growth comparison; candidates are scored for it.
    pub target_year: u16,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            baseline_year: 2016,
            target_year: 2021,
        }
    }
}

/// Minimum volumes an origin needs to be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilityConfig {
    /// Minimum commuters to the CBD region.
    pub min_cbd_commuters: i64,
    /// Minimum analysis-ready commuters from the origin.
    pub min_total_commuters: i64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_cbd_commuters: 50,
            min_total_commuters: 500,
        }
    }
}

impl EligibilityConfig {
    /// Minimum CBD commuters as an unsigned count.
    #[must_use]
    pub fn min_cbd(&self) -> u64 {
        u64::try_from(self.min_cbd_commuters).unwrap_or(0)
    }

    /// Minimum total commuters as an unsigned count.
    #[must_use]
    pub fn min_total(&self) -> u64 {
        u64::try_from(self.min_total_commuters).unwrap_or(0)
    }
}

/// Weights of the five composite score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    /// Normalized CBD commuter volume.
    pub cbd_volume: f64,
    /// Normalized CBD commuter growth.
    pub growth: f64,
    /// Public-transport gap, `1 - pt_share`.
    pub pt_gap: f64,
    /// Work-from-home gap, `1 - wfh_share`.
    pub wfh_gap: f64,
    /// Normalized mixed-mode share.
    pub mixed_mode: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cbd_volume: 0.40,
            growth: 0.20,
            pt_gap: 0.20,
            wfh_gap: 0.10,
            mixed_mode: 0.10,
        }
    }
}

impl ScoreWeights {
    /// Returns each weight with its name.
    #[must_use]
    pub const fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("cbd_volume", self.cbd_volume),
            ("growth", self.growth),
            ("pt_gap", self.pt_gap),
            ("wfh_gap", self.wfh_gap),
            ("mixed_mode", self.mixed_mode),
        ]
    }

    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }
}

/// The full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Geographic filters.
    pub filters: FilterConfig,
    /// Comparison years.
    pub periods: PeriodConfig,
    /// Eligibility thresholds.
    pub eligibility: EligibilityConfig,
    /// Score weights.
    pub weights: ScoreWeights,
}

impl PipelineConfig {
    /// Parses and validates a config. Keys absent from `toml_str` keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or the resulting
    /// config is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the embedded default config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded TOML is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_TOML)
    }

    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` when given, otherwise the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chosen config is invalid.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(Self::embedded, Self::load)
    }

    /// Serializes the effective config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Checks every configuration constraint.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filters.jurisdiction.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                name: "filters.jurisdiction",
            });
        }
        if self.filters.cbd_region.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                name: "filters.cbd_region",
            });
        }

        if self.periods.baseline_year >= self.periods.target_year {
            return Err(ConfigError::InvalidPeriods {
                baseline: self.periods.baseline_year,
                target: self.periods.target_year,
            });
        }

        for (name, value) in [
            (
                "eligibility.min_cbd_commuters",
                self.eligibility.min_cbd_commuters,
            ),
            (
                "eligibility.min_total_commuters",
                self.eligibility.min_total_commuters,
            ),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeThreshold { name, value });
            }
        }

        for (name, value) in self.weights.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }

        Ok(())
    }
}
