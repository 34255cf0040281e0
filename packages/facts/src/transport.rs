//! Residence-by-mode fact builder.
//!
//! Joins raw `(year, residence name, mode label, count)` rows to the area
//! dimension on `(year, name key)` and classifies each mode label.

use corridor_census_models::{RawModeCount, TransportRecord};
use corridor_geography::AreaDimension;
use corridor_source::mode_mapping::classify_mode;

use crate::in_jurisdiction;

/// Output of [`build_transport_facts`].
#[derive(Debug, Clone, Default)]
pub struct TransportFacts {
    /// Rows whose residence label resolved to an area.
    pub clean: Vec<TransportRecord>,
    /// Rows whose residence label did not resolve.
    pub unmatched: Vec<RawModeCount>,
}

/// Joins mode-count rows to geography and classifies their labels.
#[must_use]
pub fn build_transport_facts(dimension: &AreaDimension, rows: &[RawModeCount]) -> TransportFacts {
    let mut facts = TransportFacts::default();

    for row in rows {
        let Some(area) = dimension.lookup(row.year, &row.area_label) else {
            facts.unmatched.push(row.clone());
            continue;
        };

        let mode_label = row.mode_label.trim().to_string();
        let category = classify_mode(&mode_label);

        facts.clean.push(TransportRecord {
            year: row.year,
            area_code: area.code.clone(),
            area_name: area.name.clone(),
            sa3_name: area.sa3_name.clone(),
            sa4_name: area.sa4_name.clone(),
            gccsa_name: area.gccsa_name.clone(),
            state_name: area.state_name.clone(),
            mode_label,
            category,
            informative: category.is_informative(),
            commuters: row.commuters,
        });
    }

    log::info!(
        "Transport facts: {} joined, {} unmatched",
        facts.clean.len(),
        facts.unmatched.len()
    );

    facts
}

/// Restricts clean transport facts to informative rows inside the
/// jurisdiction. This is the input to every mode-share metric.
#[must_use]
pub fn informative_view(clean: &[TransportRecord], jurisdiction: &str) -> Vec<TransportRecord> {
    clean
        .iter()
        .filter(|r| r.informative && in_jurisdiction(r.state_name.as_deref(), jurisdiction))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use corridor_census_models::{ModeCategory, RawArea};

    use super::*;

    fn area(code: &str, name: &str, state: &str) -> RawArea {
        RawArea {
            year: 2021,
            code: code.to_string(),
            name: name.to_string(),
            sa3_name: None,
            sa4_name: None,
            gccsa_name: None,
            state_name: Some(state.to_string()),
            size: None,
            change_flag: Some(0),
            change_label: Some("No change".to_string()),
        }
    }

    fn count(area: &str, mode: &str, commuters: u64) -> RawModeCount {
        RawModeCount {
            year: 2021,
            area_label: area.to_string(),
            mode_label: mode.to_string(),
            commuters,
        }
    }

    fn dimension() -> AreaDimension {
        let rows = vec![
            area("1", "Parramatta", "New South Wales"),
            area("2", "Geelong", "Victoria"),
        ];
        AreaDimension::resolve([rows.as_slice()])
    }

    #[test]
    fn joins_and_classifies() {
        let facts = build_transport_facts(
            &dimension(),
            &[
                count("parramatta", " Train, Bus ", 10),
                count("Parramatta", "Worked at home", 5),
                count("Parramatta", "Not stated", 3),
            ],
        );

        assert_eq!(facts.clean.len(), 3);
        assert!(facts.unmatched.is_empty());

        let mixed = &facts.clean[0];
        assert_eq!(mixed.area_code, "1");
        assert_eq!(mixed.mode_label, "Train, Bus");
        assert_eq!(mixed.category, ModeCategory::MixedPtPrivate);

        let wfh = &facts.clean[1];
        assert_eq!(wfh.category, ModeCategory::Wfh);
        assert!(wfh.informative);

        let not_stated = &facts.clean[2];
        assert_eq!(not_stated.category, ModeCategory::NonInformative);
        assert!(!not_stated.informative);
    }

    #[test]
    fn carries_residence_hierarchy() {
        let mut rows = vec![area("1", "Parramatta", "New South Wales")];
        rows[0].sa3_name = Some("Parramatta".to_string());
        rows[0].sa4_name = Some("Sydney - Parramatta".to_string());
        rows[0].gccsa_name = Some("Greater Sydney".to_string());
        let dimension = AreaDimension::resolve([rows.as_slice()]);

        let facts = build_transport_facts(&dimension, &[count("Parramatta", "Bus", 4)]);
        let record = &facts.clean[0];
        assert_eq!(record.sa3_name.as_deref(), Some("Parramatta"));
        assert_eq!(record.sa4_name.as_deref(), Some("Sydney - Parramatta"));
        assert_eq!(record.gccsa_name.as_deref(), Some("Greater Sydney"));
        assert_eq!(record.state_name.as_deref(), Some("New South Wales"));
    }

    #[test]
    fn unmatched_rows_are_kept_for_audit() {
        let facts = build_transport_facts(&dimension(), &[count("Atlantis", "Train", 7)]);
        assert!(facts.clean.is_empty());
        assert_eq!(facts.unmatched, [count("Atlantis", "Train", 7)]);
    }

    #[test]
    fn informative_view_filters_jurisdiction_and_non_informative() {
        let facts = build_transport_facts(
            &dimension(),
            &[
                count("Parramatta", "Train", 10),
                count("Parramatta", "Not stated", 3),
                count("Geelong", "Train", 8),
            ],
        );
        let view = informative_view(&facts.clean, "New South Wales");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].area_code, "1");
        assert_eq!(view[0].category, ModeCategory::PublicTransport);
    }
}
