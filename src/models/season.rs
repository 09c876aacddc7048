//! Season label ordering.
//!
//! Labels look like "1993-94" or "2000-01". They are ordered by the year the
//! season starts in; anything that does not start with a four-digit year sorts
//! after all recognised labels, alphabetically.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

fn season_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d{4})(?:\s*[-/]\s*(\d{2,4}))?").unwrap())
}

/// Year the season starts in, e.g. 2000 for "2000-01".
pub fn season_start_year(label: &str) -> Option<i32> {
    season_pattern()
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Chronological comparison of two season labels.
pub fn compare_seasons(a: &str, b: &str) -> Ordering {
    match (season_start_year(a), season_start_year(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_year() {
        assert_eq!(season_start_year("2000-01"), Some(2000));
        assert_eq!(season_start_year("1999/2000"), Some(1999));
        assert_eq!(season_start_year("2021"), Some(2021));
        assert_eq!(season_start_year("spring"), None);
    }

    #[test]
    fn test_compare_across_century() {
        let mut seasons = vec!["2000-01", "1999-00", "1993-94", "unknown", "2010-11"];
        seasons.sort_by(|a, b| compare_seasons(a, b));
        assert_eq!(
            seasons,
            vec!["1993-94", "1999-00", "2000-01", "2010-11", "unknown"]
        );
    }
}
