//! Per-area-year metric aggregation.
//!
//! Mode-share metrics read the informative transport view; containment and
//! CBD metrics read the analysis-ready flow view. Ratios with a zero
//! denominator are `None`.

use std::collections::BTreeMap;

use corridor_analytics_models::{
    AreaRateRow, CbdDependencyRow, ModeShareRow, ModeTrendRow, ratio,
};
use corridor_census_models::{FlowRecord, ModeCategory, RegionLevel, TransportRecord};
use corridor_geography::normalize_name_key;

/// Per-category commuter shares for every area-year.
///
/// An area-year gets one row for every informative category, including
/// categories it has no commuters in. Non-informative records are ignored
/// so they never inflate the denominator.
#[must_use]
pub fn mode_share(informative: &[TransportRecord]) -> Vec<ModeShareRow> {
    let mut groups: BTreeMap<(u16, &str), (&str, BTreeMap<ModeCategory, u64>)> = BTreeMap::new();
    for record in informative.iter().filter(|r| r.category.is_informative()) {
        let (_, counts) = groups
            .entry((record.year, record.area_code.as_str()))
            .or_insert_with(|| (record.area_name.as_str(), BTreeMap::new()));
        *counts.entry(record.category).or_default() += record.commuters;
    }

    let categories = ModeCategory::informative();
    let mut rows = Vec::with_capacity(groups.len() * categories.len());

    for ((year, area_code), (area_name, counts)) in groups {
        let total: u64 = counts.values().sum();
        for &category in &categories {
            let commuters = counts.get(&category).copied().unwrap_or(0);
            rows.push(ModeShareRow {
                year,
                area_code: area_code.to_string(),
                area_name: area_name.to_string(),
                category,
                commuters,
                total_commuters: total,
                share: ratio(commuters, total),
            });
        }
    }

    log::debug!("Mode share: {} rows", rows.len());
    rows
}

/// Projects one category out of the mode-share rows as a single rate.
#[must_use]
pub fn category_rate(shares: &[ModeShareRow], category: ModeCategory) -> Vec<AreaRateRow> {
    shares
        .iter()
        .filter(|row| row.category == category)
        .map(|row| AreaRateRow {
            year: row.year,
            area_code: row.area_code.clone(),
            area_name: row.area_name.clone(),
            numerator: row.commuters,
            denominator: row.total_commuters,
            rate: row.share,
        })
        .collect()
}

/// Work-from-home rate per area-year.
#[must_use]
pub fn wfh_rate(shares: &[ModeShareRow]) -> Vec<AreaRateRow> {
    category_rate(shares, ModeCategory::Wfh)
}

/// Mixed public/private rate per area-year.
#[must_use]
pub fn mixed_mode_rate(shares: &[ModeShareRow]) -> Vec<AreaRateRow> {
    category_rate(shares, ModeCategory::MixedPtPrivate)
}

#[derive(Default)]
struct OriginTally<'a> {
    name: &'a str,
    matched: u64,
    total: u64,
}

/// Groups resolved flows by `(year, residence code)`, counting the
/// commuters for which `matches` holds.
fn tally_origins<'a>(
    flows: &'a [FlowRecord],
    matches: impl Fn(&FlowRecord) -> bool,
) -> BTreeMap<(u16, &'a str), OriginTally<'a>> {
    let mut groups: BTreeMap<(u16, &str), OriginTally<'_>> = BTreeMap::new();
    for record in flows {
        let Some(origin) = record.residence_code.as_deref() else {
            continue;
        };
        let tally = groups.entry((record.year, origin)).or_default();
        if tally.name.is_empty() {
            tally.name = record.residence_name.as_deref().unwrap_or_default();
        }
        tally.total += record.commuters;
        if matches(record) {
            tally.matched += record.commuters;
        }
    }
    groups
}

/// Share of each origin's commuters who work in their own area.
#[must_use]
pub fn self_containment(flows: &[FlowRecord]) -> Vec<AreaRateRow> {
    tally_origins(flows, |r| {
        r.workplace_code.is_some() && r.workplace_code == r.residence_code
    })
    .into_iter()
    .map(|((year, code), tally)| AreaRateRow {
        year,
        area_code: code.to_string(),
        area_name: tally.name.to_string(),
        numerator: tally.matched,
        denominator: tally.total,
        rate: ratio(tally.matched, tally.total),
    })
    .collect()
}

/// CBD-bound commuter volume and dependency rate per origin-year.
///
/// A workplace is in the CBD when its parent region at `level` has the
/// same name key as `cbd_region`.
#[must_use]
pub fn cbd_dependency(
    flows: &[FlowRecord],
    cbd_region: &str,
    level: RegionLevel,
) -> Vec<CbdDependencyRow> {
    let cbd_key = normalize_name_key(cbd_region);
    let rows: Vec<CbdDependencyRow> = tally_origins(flows, |r| {
        r.workplace_region_name(level)
            .is_some_and(|name| normalize_name_key(name) == cbd_key)
    })
    .into_iter()
    .map(|((year, code), tally)| CbdDependencyRow {
        year,
        origin_code: code.to_string(),
        origin_name: tally.name.to_string(),
        cbd_commuters: tally.matched,
        total_commuters: tally.total,
        dependency_rate: ratio(tally.matched, tally.total),
    })
    .collect();

    if !rows.is_empty() && rows.iter().all(|r| r.cbd_commuters == 0) {
        log::warn!("No flows reach CBD region '{cbd_region}' at level {level}");
    }

    rows
}

/// Jurisdiction-wide share of each informative category, per year.
#[must_use]
pub fn mode_trend(informative: &[TransportRecord]) -> Vec<ModeTrendRow> {
    let mut groups: BTreeMap<u16, BTreeMap<ModeCategory, u64>> = BTreeMap::new();
    for record in informative.iter().filter(|r| r.category.is_informative()) {
        *groups
            .entry(record.year)
            .or_default()
            .entry(record.category)
            .or_default() += record.commuters;
    }

    let categories = ModeCategory::informative();
    let mut rows = Vec::new();
    for (year, counts) in groups {
        let total: u64 = counts.values().sum();
        for &category in &categories {
            let commuters = counts.get(&category).copied().unwrap_or(0);
            rows.push(ModeTrendRow {
                year,
                category,
                commuters,
                total_commuters: total,
                share: ratio(commuters, total),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(year: u16, code: &str, category: ModeCategory, commuters: u64) -> TransportRecord {
        TransportRecord {
            year,
            area_code: code.to_string(),
            area_name: format!("Area {code}"),
            sa3_name: None,
            sa4_name: None,
            gccsa_name: None,
            state_name: Some("New South Wales".to_string()),
            mode_label: category.to_string(),
            category,
            informative: category.is_informative(),
            commuters,
        }
    }

    fn flow(year: u16, origin: &str, workplace: &str, sa3: &str, commuters: u64) -> FlowRecord {
        FlowRecord {
            year,
            residence_label: format!("Area {origin}"),
            residence_code: Some(origin.to_string()),
            residence_name: Some(format!("Area {origin}")),
            residence_sa3_name: None,
            residence_sa4_name: None,
            residence_gccsa_name: None,
            residence_state_name: Some("New South Wales".to_string()),
            residence_change_flag: None,
            residence_change_label: None,
            workplace_label: format!("Area {workplace}"),
            workplace_code: Some(workplace.to_string()),
            workplace_name: Some(format!("Area {workplace}")),
            workplace_sa3_name: Some(sa3.to_string()),
            workplace_sa4_name: Some("Sydney - City and Inner South".to_string()),
            workplace_gccsa_name: Some("Greater Sydney".to_string()),
            workplace_state_name: Some("New South Wales".to_string()),
            workplace_change_flag: None,
            workplace_change_label: None,
            commuters,
        }
    }

    #[test]
    fn mode_share_counts_round_trip_to_total() {
        let records = vec![
            transport(2021, "1", ModeCategory::PublicTransport, 30),
            transport(2021, "1", ModeCategory::PrivateVehicle, 50),
            transport(2021, "1", ModeCategory::PrivateVehicle, 5),
            transport(2021, "1", ModeCategory::Wfh, 15),
            transport(2021, "2", ModeCategory::ActiveTransport, 7),
        ];
        let shares = mode_share(&records);

        for (year, code) in [(2021, "1"), (2021, "2")] {
            let rows: Vec<_> = shares
                .iter()
                .filter(|r| r.year == year && r.area_code == code)
                .collect();
            assert_eq!(rows.len(), ModeCategory::informative().len());
            let sum: u64 = rows.iter().map(|r| r.commuters).sum();
            assert_eq!(sum, rows[0].total_commuters);
            let share_sum: f64 = rows.iter().filter_map(|r| r.share).sum();
            assert!((share_sum - 1.0).abs() < 1e-9);
        }

        let private = shares
            .iter()
            .find(|r| r.area_code == "1" && r.category == ModeCategory::PrivateVehicle)
            .unwrap();
        assert_eq!(private.commuters, 55);
        assert_eq!(private.total_commuters, 100);
        assert_eq!(private.share, Some(0.55));
    }

    #[test]
    fn non_informative_rows_stay_out_of_denominator() {
        let shares = mode_share(&[
            transport(2021, "1", ModeCategory::Wfh, 10),
            transport(2021, "1", ModeCategory::NonInformative, 90),
        ]);
        let wfh = wfh_rate(&shares);
        assert_eq!(wfh.len(), 1);
        assert_eq!(wfh[0].denominator, 10);
        assert_eq!(wfh[0].rate, Some(1.0));
        assert!(shares.iter().all(|r| r.category != ModeCategory::NonInformative));
    }

    #[test]
    fn zero_total_leaves_shares_undefined() {
        let shares = mode_share(&[transport(2016, "9", ModeCategory::PublicTransport, 0)]);
        assert!(!shares.is_empty());
        assert!(shares.iter().all(|r| r.share.is_none()));
        assert_eq!(mixed_mode_rate(&shares)[0].rate, None);
    }

    #[test]
    fn self_containment_and_dependency_are_bounded() {
        let flows = vec![
            flow(2021, "1", "1", "Parramatta", 20),
            flow(2021, "1", "2", "Sydney Inner City", 30),
            flow(2021, "1", "3", "Ryde - Hunters Hill", 50),
            flow(2021, "4", "4", "Blacktown", 0),
        ];

        let containment = self_containment(&flows);
        assert_eq!(containment.len(), 2);
        assert_eq!(containment[0].numerator, 20);
        assert_eq!(containment[0].rate, Some(0.2));
        assert_eq!(containment[1].denominator, 0);
        assert_eq!(containment[1].rate, None);

        let cbd = cbd_dependency(&flows, "sydney inner city", RegionLevel::Sa3);
        assert_eq!(cbd[0].cbd_commuters, 30);
        assert_eq!(cbd[0].total_commuters, 100);
        assert_eq!(cbd[0].dependency_rate, Some(0.3));
        assert_eq!(cbd[1].dependency_rate, None);

        for rate in containment
            .iter()
            .filter_map(|r| r.rate)
            .chain(cbd.iter().filter_map(|r| r.dependency_rate))
        {
            assert!((0.0..=1.0).contains(&rate));
        }
    }

    #[test]
    fn cbd_region_level_selects_hierarchy_column() {
        let flows = vec![flow(2021, "1", "2", "Sydney Inner City", 30)];
        let by_gccsa = cbd_dependency(&flows, "Greater Sydney", RegionLevel::Gccsa);
        assert_eq!(by_gccsa[0].cbd_commuters, 30);
        let by_sa3 = cbd_dependency(&flows, "Greater Sydney", RegionLevel::Sa3);
        assert_eq!(by_sa3[0].cbd_commuters, 0);
        assert_eq!(by_sa3[0].dependency_rate, Some(0.0));
    }

    #[test]
    fn mode_trend_ignores_area() {
        let trend = mode_trend(&[
            transport(2016, "1", ModeCategory::PublicTransport, 10),
            transport(2016, "2", ModeCategory::PublicTransport, 30),
            transport(2016, "2", ModeCategory::PrivateVehicle, 60),
            transport(2021, "1", ModeCategory::Wfh, 5),
        ]);
        let pt_2016 = trend
            .iter()
            .find(|r| r.year == 2016 && r.category == ModeCategory::PublicTransport)
            .unwrap();
        assert_eq!(pt_2016.commuters, 40);
        assert_eq!(pt_2016.total_commuters, 100);
        assert_eq!(pt_2016.share, Some(0.4));

        let wfh_2021 = trend
            .iter()
            .find(|r| r.year == 2021 && r.category == ModeCategory::Wfh)
            .unwrap();
        assert_eq!(wfh_2021.share, Some(1.0));
    }
}
