//! CBD growth between the baseline and target census years.

use std::collections::BTreeMap;

use corridor_analytics_models::{CbdDependencyRow, CbdGrowthRow};
use corridor_config::PeriodConfig;

/// Relative change from `baseline` to `target`, defined only for a
/// strictly positive baseline.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn growth_rate(baseline: u64, target: u64) -> Option<f64> {
    (baseline > 0).then(|| (target as f64 - baseline as f64) / baseline as f64)
}

fn signed_change(baseline: u64, target: u64) -> Option<i64> {
    let baseline = i64::try_from(baseline).ok()?;
    let target = i64::try_from(target).ok()?;
    target.checked_sub(baseline)
}

/// Pairs each target-year origin with its baseline-year row by origin
/// code.
///
/// Origins absent from the baseline keep their target values and leave
/// every change undefined.
#[must_use]
pub fn cbd_growth(dependency: &[CbdDependencyRow], periods: &PeriodConfig) -> Vec<CbdGrowthRow> {
    let baseline: BTreeMap<&str, &CbdDependencyRow> = dependency
        .iter()
        .filter(|r| r.year == periods.baseline_year)
        .map(|r| (r.origin_code.as_str(), r))
        .collect();

    let mut rows: Vec<CbdGrowthRow> = dependency
        .iter()
        .filter(|r| r.year == periods.target_year)
        .map(|target| {
            let base = baseline.get(target.origin_code.as_str()).copied();
            let base_count = base.map(|b| b.cbd_commuters);
            let base_rate = base.and_then(|b| b.dependency_rate);

            CbdGrowthRow {
                origin_code: target.origin_code.clone(),
                origin_name: target.origin_name.clone(),
                baseline_year: periods.baseline_year,
                target_year: periods.target_year,
                baseline_cbd_commuters: base_count,
                target_cbd_commuters: target.cbd_commuters,
                baseline_dependency_rate: base_rate,
                target_dependency_rate: target.dependency_rate,
                commuter_change: base_count
                    .and_then(|b| signed_change(b, target.cbd_commuters)),
                dependency_rate_change: base_rate
                    .zip(target.dependency_rate)
                    .map(|(b, t)| t - b),
                growth_rate: base_count.and_then(|b| growth_rate(b, target.cbd_commuters)),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.origin_code.cmp(&b.origin_code));

    let unpaired = rows.iter().filter(|r| r.baseline_cbd_commuters.is_none()).count();
    log::info!(
        "CBD growth {}->{}: {} origins, {unpaired} without a baseline",
        periods.baseline_year,
        periods.target_year,
        rows.len()
    );

    rows
}

#[cfg(test)]
mod tests {
    use corridor_analytics_models::ratio;

    use super::*;

    fn dep(year: u16, code: &str, cbd: u64, total: u64) -> CbdDependencyRow {
        CbdDependencyRow {
            year,
            origin_code: code.to_string(),
            origin_name: format!("Area {code}"),
            cbd_commuters: cbd,
            total_commuters: total,
            dependency_rate: ratio(cbd, total),
        }
    }

    #[test]
    fn growth_rate_is_undefined_for_zero_baseline() {
        assert_eq!(growth_rate(0, 0), None);
        assert_eq!(growth_rate(0, 25), None);
        assert_eq!(growth_rate(100, 100), Some(0.0));
        assert_eq!(growth_rate(100, 150), Some(0.5));
        assert_eq!(growth_rate(100, 50), Some(-0.5));
    }

    #[test]
    fn growth_is_zero_only_for_equal_counts() {
        for (baseline, target) in [(1, 2), (10, 9), (7, 70), (3, 3)] {
            let rate = growth_rate(baseline, target).unwrap();
            assert_eq!(rate == 0.0, baseline == target);
        }
    }

    #[test]
    fn pairs_target_and_baseline_by_origin_code() {
        let rows = cbd_growth(
            &[
                dep(2011, "1", 10, 100),
                dep(2016, "1", 40, 200),
                dep(2021, "1", 60, 200),
                dep(2021, "2", 30, 100),
                dep(2016, "3", 0, 50),
                dep(2021, "3", 5, 50),
            ],
            &PeriodConfig::default(),
        );
        assert_eq!(rows.len(), 3);

        let one = &rows[0];
        assert_eq!(one.baseline_cbd_commuters, Some(40));
        assert_eq!(one.commuter_change, Some(20));
        assert_eq!(one.growth_rate, Some(0.5));
        assert!((one.dependency_rate_change.unwrap() - 0.1).abs() < 1e-12);

        let missing = &rows[1];
        assert_eq!(missing.origin_code, "2");
        assert_eq!(missing.baseline_cbd_commuters, None);
        assert_eq!(missing.commuter_change, None);
        assert_eq!(missing.growth_rate, None);

        let from_zero = &rows[2];
        assert_eq!(from_zero.commuter_change, Some(5));
        assert_eq!(from_zero.growth_rate, None);
    }

    #[test]
    fn negative_change_is_signed() {
        let rows = cbd_growth(
            &[dep(2016, "1", 80, 100), dep(2021, "1", 60, 100)],
            &PeriodConfig::default(),
        );
        assert_eq!(rows[0].commuter_change, Some(-20));
        assert_eq!(rows[0].growth_rate, Some(-0.25));
    }
}
