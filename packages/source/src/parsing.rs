//! Lenient value parsing for census CSV cells.

/// Returns the trimmed string value of `field`, or `None` when the field is
/// absent.
#[must_use]
pub fn get_str<'a>(record: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
}

/// Returns the trimmed value of `field` when it is present and non-empty.
#[must_use]
pub fn get_non_empty(record: &serde_json::Value, field: &str) -> Option<String> {
    get_str(record, field)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Parses a commuter count cell.
///
/// Accepts thousands separators and integral decimals (`"1,204"`,
/// `"12.0"`). Returns `None` for blank, negative, fractional, or
/// non-numeric input.
#[must_use]
pub fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(n) = cleaned.parse::<u64>() {
        return Some(n);
    }

    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > 9.0e15 {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value as u64)
}

/// Parses a floating point cell, ignoring thousands separators.
#[must_use]
pub fn parse_f64(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an integer flag cell such as a boundary change flag.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    trimmed.parse::<i32>().ok().or_else(|| {
        parse_f64(trimmed)
            .filter(|v| v.fract() == 0.0 && v.abs() <= f64::from(i32::MAX))
            .map(|v| {
                #[allow(clippy::cast_possible_truncation)]
                let flag = v as i32;
                flag
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_formatted_counts() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 1,204 "), Some(1204));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("0"), Some(0));
    }

    #[test]
    fn rejects_malformed_counts() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("n/a"), None);
        assert_eq!(parse_count("NaN"), None);
    }

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag("0"), Some(0));
        assert_eq!(parse_flag("3.0"), Some(3));
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("x"), None);
    }

    #[test]
    fn reads_trimmed_fields() {
        let record = serde_json::json!({"name": "  Parramatta ", "blank": "  "});
        assert_eq!(get_str(&record, "name"), Some("Parramatta"));
        assert_eq!(get_non_empty(&record, "blank"), None);
        assert_eq!(get_non_empty(&record, "missing"), None);
    }
}
