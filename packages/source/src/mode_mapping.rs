//! Travel-mode classification.
//!
//! Maps free-text method-of-travel labels to the canonical
//! [`ModeCategory`] taxonomy. Census years word their labels differently
//! ("Tram (includes light rail)", "Tram/light rail", "Car, as driver"), so
//! classification is keyword based and case-insensitive.
//!
//! The rules in [`MODE_RULES`] are evaluated top to bottom and the first
//! match wins. The order is part of the contract: a label such as
//! `"Train, Car, as driver"` satisfies both the mixed-mode rule and the
//! public-transport rule, and must land in the earlier one.

use corridor_census_models::ModeCategory;

/// Labels that carry no travel behavior.
const NON_INFORMATIVE_TERMS: &[&str] = &["not applicable", "did not go to work", "not stated"];

const WFH_TERMS: &[&str] = &["worked at home"];

/// Public-transport terms grouped by service. Terms in one group name the
/// same service ("tram" and "light rail" appear together in a single
/// published label).
const PT_SERVICES: &[&[&str]] = &[
    &["train"],
    &["bus"],
    &["ferry"],
    &["tram", "light rail"],
];

/// Private-vehicle terms that make a public-transport trip mixed.
const MIXED_PRIVATE_TERMS: &[&str] = &[
    "car",
    "truck",
    "motorbike",
    "scooter",
    "driver",
    "passenger",
];

const ACTIVE_TERMS: &[&str] = &["walked only", "bicycle"];

const PRIVATE_VEHICLE_TERMS: &[&str] = &["car", "truck", "motorbike", "scooter", "taxi"];

/// Category assigned when no rule matches.
pub const DEFAULT_CATEGORY: ModeCategory = ModeCategory::Other;

/// One entry of the ordered classification rule list.
#[derive(Debug, Clone, Copy)]
pub struct ModeRule {
    /// Short identifier used in logs and tests.
    pub name: &'static str,
    /// Category assigned when the predicate matches.
    pub category: ModeCategory,
    /// Predicate over the lowercased label.
    pub predicate: fn(&str) -> bool,
}

/// Ordered classification rules. First match wins; unmatched labels fall
/// through to [`DEFAULT_CATEGORY`].
pub const MODE_RULES: &[ModeRule] = &[
    ModeRule {
        name: "non_informative",
        category: ModeCategory::NonInformative,
        predicate: is_non_informative,
    },
    ModeRule {
        name: "worked_at_home",
        category: ModeCategory::Wfh,
        predicate: is_worked_at_home,
    },
    ModeRule {
        name: "mixed_pt_private",
        category: ModeCategory::MixedPtPrivate,
        predicate: is_mixed_public_private,
    },
    ModeRule {
        name: "public_transport",
        category: ModeCategory::PublicTransport,
        predicate: has_public_transport,
    },
    ModeRule {
        name: "active_transport",
        category: ModeCategory::ActiveTransport,
        predicate: is_active_only,
    },
    ModeRule {
        name: "private_vehicle",
        category: ModeCategory::PrivateVehicle,
        predicate: has_private_vehicle,
    },
];

/// Maps a raw travel-mode label to its canonical category.
///
/// Total and pure: every label, including the empty string, maps to exactly
/// one category, defaulting to [`ModeCategory::Other`].
#[must_use]
pub fn classify_mode(raw: &str) -> ModeCategory {
    matching_rule(raw).map_or(DEFAULT_CATEGORY, |rule| rule.category)
}

/// Returns the first rule in [`MODE_RULES`] that matches `raw`, if any.
#[must_use]
pub fn matching_rule(raw: &str) -> Option<&'static ModeRule> {
    let lower = raw.trim().to_lowercase();
    MODE_RULES.iter().find(|rule| (rule.predicate)(&lower))
}

fn is_non_informative(lower: &str) -> bool {
    contains_any(lower, NON_INFORMATIVE_TERMS)
}

fn is_worked_at_home(lower: &str) -> bool {
    contains_any(lower, WFH_TERMS)
}

/// A public-transport leg combined with a private-vehicle leg or with a
/// second, different public-transport service.
fn is_mixed_public_private(lower: &str) -> bool {
    let services = pt_service_count(lower);
    services > 0 && (contains_any(lower, MIXED_PRIVATE_TERMS) || services > 1)
}

fn has_public_transport(lower: &str) -> bool {
    pt_service_count(lower) > 0
}

fn is_active_only(lower: &str) -> bool {
    contains_any(lower, ACTIVE_TERMS)
        && !has_public_transport(lower)
        && !contains_any(lower, MIXED_PRIVATE_TERMS)
        && !contains_any(lower, PRIVATE_VEHICLE_TERMS)
}

fn has_private_vehicle(lower: &str) -> bool {
    contains_any(lower, PRIVATE_VEHICLE_TERMS)
}

fn pt_service_count(lower: &str) -> usize {
    PT_SERVICES
        .iter()
        .filter(|terms| contains_any(lower, terms))
        .count()
}

/// Checks if `haystack` contains any of the given `needles`.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_single_method_labels() {
        assert_eq!(classify_mode("Train"), ModeCategory::PublicTransport);
        assert_eq!(classify_mode("Bus"), ModeCategory::PublicTransport);
        assert_eq!(classify_mode("Ferry"), ModeCategory::PublicTransport);
        assert_eq!(
            classify_mode("Tram (includes light rail)"),
            ModeCategory::PublicTransport
        );
        assert_eq!(classify_mode("Tram/light rail"), ModeCategory::PublicTransport);
        assert_eq!(classify_mode("Car, as driver"), ModeCategory::PrivateVehicle);
        assert_eq!(classify_mode("Car, as passenger"), ModeCategory::PrivateVehicle);
        assert_eq!(classify_mode("Taxi"), ModeCategory::PrivateVehicle);
        assert_eq!(classify_mode("Motorbike/scooter"), ModeCategory::PrivateVehicle);
        assert_eq!(classify_mode("Walked only"), ModeCategory::ActiveTransport);
        assert_eq!(classify_mode("Bicycle"), ModeCategory::ActiveTransport);
    }

    #[test]
    fn combined_public_transport_is_mixed() {
        assert_eq!(classify_mode("Train, Bus"), ModeCategory::MixedPtPrivate);
        assert_eq!(
            matching_rule("Train, Bus").map(|r| r.name),
            Some("mixed_pt_private")
        );
    }

    #[test]
    fn public_transport_with_vehicle_is_mixed() {
        assert_eq!(
            classify_mode("Train, Car, as driver"),
            ModeCategory::MixedPtPrivate
        );
        assert_eq!(
            classify_mode("Bus, Car, as passenger"),
            ModeCategory::MixedPtPrivate
        );
        assert_eq!(classify_mode("Ferry, Truck"), ModeCategory::MixedPtPrivate);
    }

    #[test]
    fn public_transport_with_non_vehicle_leg_stays_public() {
        assert_eq!(classify_mode("Train, Other"), ModeCategory::PublicTransport);
        assert_eq!(
            classify_mode("Bus, Walked only"),
            ModeCategory::PublicTransport
        );
    }

    #[test]
    fn active_requires_no_vehicle_terms() {
        assert_eq!(
            classify_mode("Bicycle, Walked only"),
            ModeCategory::ActiveTransport
        );
        assert_eq!(classify_mode("Bicycle, Taxi"), ModeCategory::PrivateVehicle);
        assert_eq!(
            classify_mode("Bicycle, Car, as driver"),
            ModeCategory::PrivateVehicle
        );
    }

    #[test]
    fn worked_at_home_is_wfh() {
        let category = classify_mode("Worked at home");
        assert_eq!(category, ModeCategory::Wfh);
        assert!(category.is_informative());
    }

    #[test]
    fn non_informative_labels() {
        for label in ["Not stated", "Not applicable", "Did not go to work"] {
            let category = classify_mode(label);
            assert_eq!(category, ModeCategory::NonInformative, "{label}");
            assert!(!category.is_informative());
        }
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        assert_eq!(classify_mode("  WORKED AT HOME "), ModeCategory::Wfh);
        assert_eq!(classify_mode("train, BUS"), ModeCategory::MixedPtPrivate);
    }

    #[test]
    fn unknown_fallback() {
        assert_eq!(classify_mode("Other"), ModeCategory::Other);
        assert_eq!(classify_mode("Other two methods"), ModeCategory::Other);
        assert_eq!(classify_mode(""), ModeCategory::Other);
        assert!(matching_rule("Three methods").is_none());
    }

    #[test]
    fn classification_is_idempotent() {
        for label in [
            "Train, Bus",
            "Worked at home",
            "Not stated",
            "Car, as driver",
            "Bicycle",
            "Other",
        ] {
            assert_eq!(classify_mode(label), classify_mode(label));
        }
    }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<&str> = MODE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "non_informative",
                "worked_at_home",
                "mixed_pt_private",
                "public_transport",
                "active_transport",
                "private_vehicle",
            ]
        );
    }
}
