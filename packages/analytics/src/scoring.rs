//! Bus candidate scoring.
//!
//! Scoring is two-phase. Phase one filters target-year origins on volume
//! and feature completeness and materializes their raw components. Phase
//! two computes the population maxima over that eligible set and only then
//! finalizes each score, so every score depends on the whole set.

use std::collections::BTreeMap;

use corridor_analytics_models::{BusCandidate, CbdDependencyRow, CbdGrowthRow, ModeShareRow};
use corridor_census_models::ModeCategory;
use corridor_config::{EligibilityConfig, ScoreWeights};

/// Derived inputs the scorer reads.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    /// CBD volume and dependency rows, all years.
    pub dependency: &'a [CbdDependencyRow],
    /// Mode-share rows, all years.
    pub shares: &'a [ModeShareRow],
    /// Growth rows into the target year.
    pub growth: &'a [CbdGrowthRow],
}

/// Raw components of an origin that passed eligibility.
#[derive(Debug, Clone)]
struct EligibleOrigin<'a> {
    row: &'a CbdDependencyRow,
    growth_rate: f64,
    pt_share: f64,
    wfh_share: f64,
    mixed_share: f64,
}

/// Scales `value` by the population maximum, or `0.0` when the maximum is
/// not positive.
fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { 0.0 }
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

/// Phase one: eligibility filter over the `year` origins.
fn eligible_origins<'a>(
    inputs: &ScoringInputs<'a>,
    year: u16,
    eligibility: &EligibilityConfig,
) -> Vec<EligibleOrigin<'a>> {
    let shares: BTreeMap<(&str, ModeCategory), Option<f64>> = inputs
        .shares
        .iter()
        .filter(|r| r.year == year)
        .map(|r| ((r.area_code.as_str(), r.category), r.share))
        .collect();
    let growth: BTreeMap<&str, Option<f64>> = inputs
        .growth
        .iter()
        .filter(|r| r.target_year == year)
        .map(|r| (r.origin_code.as_str(), r.growth_rate))
        .collect();

    let share = |code: &str, category| shares.get(&(code, category)).copied().flatten();

    let mut below_volume = 0usize;
    let mut incomplete = 0usize;
    let mut eligible = Vec::new();

    for row in inputs.dependency.iter().filter(|r| r.year == year) {
        if row.cbd_commuters < eligibility.min_cbd()
            || row.total_commuters < eligibility.min_total()
        {
            below_volume += 1;
            continue;
        }

        let code = row.origin_code.as_str();
        let (Some(pt_share), Some(wfh_share), Some(mixed_share)) = (
            share(code, ModeCategory::PublicTransport),
            share(code, ModeCategory::Wfh),
            share(code, ModeCategory::MixedPtPrivate),
        ) else {
            incomplete += 1;
            continue;
        };

        eligible.push(EligibleOrigin {
            row,
            growth_rate: growth.get(code).copied().flatten().unwrap_or(0.0),
            pt_share,
            wfh_share,
            mixed_share,
        });
    }

    log::info!(
        "Candidates {year}: {} eligible, {below_volume} below volume thresholds, {incomplete} missing mode shares",
        eligible.len()
    );

    eligible
}

/// Scores and ranks the eligible origins of `year`.
///
/// The result is sorted by descending score, then by ascending origin code,
/// and carries a 1-based rank.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_candidates(
    inputs: &ScoringInputs<'_>,
    year: u16,
    eligibility: &EligibilityConfig,
    weights: &ScoreWeights,
) -> Vec<BusCandidate> {
    let eligible = eligible_origins(inputs, year, eligibility);

    let max_cbd = max_of(eligible.iter().map(|e| e.row.cbd_commuters as f64));
    let max_growth = max_of(eligible.iter().map(|e| e.growth_rate));
    let max_mixed = max_of(eligible.iter().map(|e| e.mixed_share));

    let mut candidates: Vec<BusCandidate> = eligible
        .into_iter()
        .map(|e| {
            let cbd_volume_component = normalize(e.row.cbd_commuters as f64, max_cbd);
            let growth_component = normalize(e.growth_rate.max(0.0), max_growth);
            let pt_gap_component = 1.0 - e.pt_share;
            let wfh_gap_component = 1.0 - e.wfh_share;
            let mixed_mode_component = normalize(e.mixed_share, max_mixed);

            let score = weights.cbd_volume.mul_add(
                cbd_volume_component,
                weights.growth.mul_add(
                    growth_component,
                    weights.pt_gap.mul_add(
                        pt_gap_component,
                        weights
                            .wfh_gap
                            .mul_add(wfh_gap_component, weights.mixed_mode * mixed_mode_component),
                    ),
                ),
            );

            BusCandidate {
                rank: 0,
                year,
                origin_code: e.row.origin_code.clone(),
                origin_name: e.row.origin_name.clone(),
                cbd_commuters: e.row.cbd_commuters,
                total_commuters: e.row.total_commuters,
                growth_rate: e.growth_rate,
                pt_share: e.pt_share,
                wfh_share: e.wfh_share,
                mixed_share: e.mixed_share,
                cbd_volume_component,
                growth_component,
                pt_gap_component,
                wfh_gap_component,
                mixed_mode_component,
                score,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.origin_code.cmp(&b.origin_code))
    });
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }

    if let Some(top) = candidates.first() {
        log::info!(
            "Top candidate {year}: {} ({}) score {:.4}",
            top.origin_name,
            top.origin_code,
            top.score
        );
    }

    candidates
}
