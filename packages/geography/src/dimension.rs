//! The unified cross-year area dimension and its join indexes.

use std::collections::{BTreeMap, BTreeSet};

use corridor_census_models::{Area, RawArea};
use serde::{Deserialize, Serialize};

use crate::{normalize_area, normalize_name_key};

/// A name key that more than one area code normalizes to within a year.
///
/// The first area in feed order owns the key; every later code with the
/// same key is reported here and is unreachable by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousAreaName {
    /// Census year.
    pub year: u16,
    /// Colliding name key.
    pub name_key: String,
    /// Code the key resolves to.
    pub resolved_code: String,
    /// Code that lost the key.
    pub shadowed_code: String,
    /// Display name of the shadowed area.
    pub shadowed_name: String,
}

/// All areas for all census years, with `(year, name key)` and
/// `(year, code)` lookups.
#[derive(Debug, Clone, Default)]
pub struct AreaDimension {
    areas: Vec<Area>,
    by_name: BTreeMap<(u16, String), usize>,
    by_code: BTreeMap<(u16, String), usize>,
    ambiguous: Vec<AmbiguousAreaName>,
}

impl AreaDimension {
    /// Normalizes and unions the adapted area rows of every year.
    ///
    /// Rows repeating an existing `(year, code)` collapse into the first
    /// occurrence. Rows with a blank code or blank name stay in the
    /// dimension but are never matched by a join.
    #[must_use]
    pub fn resolve<'a, I>(years: I) -> Self
    where
        I: IntoIterator<Item = &'a [RawArea]>,
    {
        let mut dimension = Self::default();

        for rows in years {
            let before = dimension.areas.len();
            let year = rows.first().map(|r| r.year);
            for raw in rows {
                dimension.insert(normalize_area(raw));
            }
            if let Some(year) = year {
                log::info!(
                    "[{year}] resolved {} areas",
                    dimension.areas.len() - before
                );
            }
        }

        if !dimension.ambiguous.is_empty() {
            log::warn!(
                "{} area codes share a name key with an earlier area and cannot be joined by name",
                dimension.ambiguous.len()
            );
        }

        dimension
    }

    fn insert(&mut self, area: Area) {
        let code_key = (area.year, area.code.clone());
        if !area.code.is_empty() && self.by_code.contains_key(&code_key) {
            log::debug!("[{}] duplicate area code {}, keeping first", area.year, area.code);
            return;
        }

        let idx = self.areas.len();

        if !area.code.is_empty() {
            self.by_code.insert(code_key, idx);

            if !area.name_key.is_empty() {
                let name_key = (area.year, area.name_key.clone());
                if let Some(&owner) = self.by_name.get(&name_key) {
                    let resolved = &self.areas[owner];
                    log::warn!(
                        "[{}] name key '{}' maps to {} and {}; joins resolve to {}",
                        area.year,
                        area.name_key,
                        resolved.code,
                        area.code,
                        resolved.code
                    );
                    self.ambiguous.push(AmbiguousAreaName {
                        year: area.year,
                        name_key: area.name_key.clone(),
                        resolved_code: resolved.code.clone(),
                        shadowed_code: area.code.clone(),
                        shadowed_name: area.name.clone(),
                    });
                } else {
                    self.by_name.insert(name_key, idx);
                }
            }
        }

        self.areas.push(area);
    }

    /// All areas in year order, then feed order.
    #[must_use]
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Number of areas across all years.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Returns `true` when no areas were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Census years present in the dimension.
    #[must_use]
    pub fn years(&self) -> BTreeSet<u16> {
        self.areas.iter().map(|a| a.year).collect()
    }

    /// Resolves a raw area label for `year`.
    #[must_use]
    pub fn lookup(&self, year: u16, label: &str) -> Option<&Area> {
        let key = normalize_name_key(label);
        if key.is_empty() {
            return None;
        }
        self.by_name
            .get(&(year, key))
            .map(|&idx| &self.areas[idx])
    }

    /// Looks up an area by its code within `year`.
    #[must_use]
    pub fn by_code(&self, year: u16, code: &str) -> Option<&Area> {
        self.by_code
            .get(&(year, code.to_string()))
            .map(|&idx| &self.areas[idx])
    }

    /// Name keys shared by more than one area code within a year.
    #[must_use]
    pub fn ambiguous_names(&self) -> &[AmbiguousAreaName] {
        &self.ambiguous
    }
}

#[cfg(test)]
mod tests {
    use corridor_census_models::AreaSize;

    use super::*;

    fn raw(year: u16, code: &str, name: &str) -> RawArea {
        RawArea {
            year,
            code: code.to_string(),
            name: name.to_string(),
            sa3_name: None,
            sa4_name: None,
            gccsa_name: None,
            state_name: Some("New South Wales".to_string()),
            size: Some(AreaSize::SquareKilometres(1.0)),
            change_flag: (year == 2021).then_some(0),
            change_label: (year == 2021).then(|| "No change".to_string()),
        }
    }

    #[test]
    fn unions_years_in_order() {
        let y2016 = vec![raw(2016, "1", "Alpha"), raw(2016, "2", "Beta")];
        let y2021 = vec![raw(2021, "10", "Alpha")];
        let dim = AreaDimension::resolve([y2016.as_slice(), y2021.as_slice()]);

        assert_eq!(dim.len(), 3);
        assert_eq!(dim.years().into_iter().collect::<Vec<_>>(), [2016, 2021]);
        assert_eq!(dim.lookup(2016, "alpha ").unwrap().code, "1");
        assert_eq!(dim.lookup(2021, "ALPHA").unwrap().code, "10");
        assert!(dim.lookup(2011, "Alpha").is_none());
        assert_eq!(dim.by_code(2016, "2").unwrap().name, "Beta");
    }

    #[test]
    fn name_key_is_unique_per_year() {
        let rows = vec![
            raw(2016, "1", "Alpha"),
            raw(2016, "2", " ALPHA"),
            raw(2016, "3", "Gamma"),
        ];
        let dim = AreaDimension::resolve([rows.as_slice()]);

        assert_eq!(dim.len(), 3);
        assert_eq!(dim.lookup(2016, "alpha").unwrap().code, "1");
        assert_eq!(
            dim.ambiguous_names(),
            [AmbiguousAreaName {
                year: 2016,
                name_key: "ALPHA".to_string(),
                resolved_code: "1".to_string(),
                shadowed_code: "2".to_string(),
                shadowed_name: " ALPHA".to_string(),
            }]
        );

        let mut keys = BTreeSet::new();
        for area in dim.areas() {
            if let Some(resolved) = dim.lookup(area.year, &area.name) {
                keys.insert((resolved.year, resolved.name_key.clone(), resolved.code.clone()));
            }
        }
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn duplicate_code_collapses_to_first() {
        let rows = vec![raw(2021, "1", "Alpha"), raw(2021, "1", "Alpha (dup)")];
        let dim = AreaDimension::resolve([rows.as_slice()]);
        assert_eq!(dim.len(), 1);
        assert_eq!(dim.by_code(2021, "1").unwrap().name, "Alpha");
        assert!(dim.ambiguous_names().is_empty());
    }

    #[test]
    fn blank_rows_pass_through_unjoinable() {
        let rows = vec![raw(2011, "", "Orphan"), raw(2011, "5", "  ")];
        let dim = AreaDimension::resolve([rows.as_slice()]);
        assert_eq!(dim.len(), 2);
        assert!(dim.lookup(2011, "Orphan").is_none());
        assert!(dim.lookup(2011, "").is_none());
        assert!(dim.by_code(2011, "5").is_some());
    }

    #[test]
    fn change_metadata_is_null_outside_latest_year() {
        let y2016 = vec![raw(2016, "1", "Alpha")];
        let y2021 = vec![raw(2021, "10", "Alpha")];
        let dim = AreaDimension::resolve([y2016.as_slice(), y2021.as_slice()]);
        assert_eq!(dim.by_code(2016, "1").unwrap().change_flag, None);
        assert_eq!(dim.by_code(2021, "10").unwrap().change_flag, Some(0));
    }
}
