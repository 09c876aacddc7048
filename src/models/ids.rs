//! Deterministic match identifiers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A match identifier derived from the fixture's identity fields.
///
/// Two rows describing the same fixture (season, date, home side, away side)
/// always hash to the same id, which is how duplicate rows are spotted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(String);

impl MatchId {
    /// Hash the fixture fields with SHA256 and keep the first 16 hex characters.
    pub fn generate(season: &str, date: NaiveDate, home_team: &str, away_team: &str) -> Self {
        let date = date.format("%Y-%m-%d").to_string();
        let mut hasher = Sha256::new();
        for (i, field) in [season, date.as_str(), home_team, away_team]
            .iter()
            .enumerate()
        {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.trim().as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchId({})", self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_match_id_deterministic() {
        let a = MatchId::generate("2000-01", date(2000, 8, 19), "Arsenal", "Leeds");
        let b = MatchId::generate("2000-01", date(2000, 8, 19), "Arsenal", "Leeds");
        assert_eq!(a, b);
    }

    #[test]
    fn test_match_id_home_away_not_symmetric() {
        let a = MatchId::generate("2000-01", date(2000, 8, 19), "Arsenal", "Leeds");
        let b = MatchId::generate("2000-01", date(2000, 8, 19), "Leeds", "Arsenal");
        assert_ne!(a, b);
    }

    #[test]
    fn test_match_id_ignores_surrounding_whitespace() {
        let a = MatchId::generate("2000-01", date(2000, 8, 19), " Arsenal", "Leeds ");
        let b = MatchId::generate("2000-01", date(2000, 8, 19), "Arsenal", "Leeds");
        assert_eq!(a, b);
    }

    #[test]
    fn test_match_id_length_and_hex() {
        let id = MatchId::generate("1993-94", date(1993, 8, 14), "Everton", "Southampton");
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_match_id_serialization() {
        let id = MatchId::generate("1993-94", date(1993, 8, 14), "Everton", "Southampton");
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: MatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_match_id_debug() {
        let id = MatchId::from("abc123");
        assert_eq!(format!("{:?}", id), "MatchId(abc123)");
        assert_eq!(format!("{}", id), "abc123");
    }
}
