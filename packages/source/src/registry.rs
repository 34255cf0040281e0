//! Feed registry: loads the per-year feed definitions.
//!
//! Each `.toml` file in `packages/source/feeds/` is baked into the binary at
//! compile time via [`include_str!`]. A user-supplied directory of TOML
//! files replaces the embedded set entirely.

use std::path::Path;

use crate::SourceError;
use crate::feed_def::{FeedDefinition, parse_feed_toml};

/// TOML configs embedded at compile time.
const FEED_TOMLS: &[(&str, &str)] = &[
    ("census_2011", include_str!("../feeds/census_2011.toml")),
    ("census_2016", include_str!("../feeds/census_2016.toml")),
    ("census_2021", include_str!("../feeds/census_2021.toml")),
];

/// Returns the embedded feed definitions, ordered by year.
///
/// # Errors
///
/// Returns [`SourceError::FeedDefinition`] if an embedded TOML is malformed.
pub fn embedded_feeds() -> Result<Vec<FeedDefinition>, SourceError> {
    let mut feeds = FEED_TOMLS
        .iter()
        .map(|(name, toml)| parse_named(name, toml))
        .collect::<Result<Vec<_>, _>>()?;
    feeds.sort_by_key(|f| f.year);
    Ok(feeds)
}

/// Loads every `*.toml` feed definition in `dir`, ordered by year.
///
/// # Errors
///
/// Returns [`SourceError`] if the directory cannot be read, a file is
/// malformed, or two files declare the same year.
pub fn feeds_from_dir(dir: &Path) -> Result<Vec<FeedDefinition>, SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SourceError::Open {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut feeds = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let text = std::fs::read_to_string(&path)?;
        let name = path.display().to_string();
        log::debug!("Loading feed definition {name}");
        feeds.push(parse_named(&name, &text)?);
    }

    feeds.sort_by_key(|f| f.year);
    if let Some(pair) = feeds.windows(2).find(|w| w[0].year == w[1].year) {
        return Err(SourceError::Normalization {
            message: format!("duplicate feed definitions for year {}", pair[0].year),
        });
    }

    Ok(feeds)
}

fn parse_named(name: &str, toml: &str) -> Result<FeedDefinition, SourceError> {
    parse_feed_toml(toml).map_err(|e| SourceError::FeedDefinition {
        name: name.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed_def::SizeUnit;

    #[test]
    fn loads_all_embedded_feeds() {
        let feeds = embedded_feeds().unwrap();
        let years: Vec<u16> = feeds.iter().map(|f| f.year).collect();
        assert_eq!(years, [2011, 2016, 2021]);
    }

    #[test]
    fn only_latest_year_publishes_change_metadata() {
        let feeds = embedded_feeds().unwrap();
        for feed in &feeds {
            let has_change = feed.area.change_flag.is_some() && feed.area.change_label.is_some();
            assert_eq!(has_change, feed.year == 2021, "year {}", feed.year);
        }
    }

    #[test]
    fn workplace_column_differs_between_middle_and_latest_year() {
        let feeds = embedded_feeds().unwrap();
        assert_eq!(feeds[1].flow.workplace, "POW_SA2_16");
        assert_eq!(feeds[2].flow.workplace, "SA2 (POW)");
    }

    #[test]
    fn one_year_publishes_square_kilometres() {
        let feeds = embedded_feeds().unwrap();
        let km_years: Vec<u16> = feeds
            .iter()
            .filter(|f| {
                f.area
                    .size
                    .as_ref()
                    .is_some_and(|s| s.unit == SizeUnit::SquareKilometres)
            })
            .map(|f| f.year)
            .collect();
        assert_eq!(km_years, [2021]);
    }
}
