//! Match records as loaded from the results file, and their scored form.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MatchId;

/// Final outcome of a match from the home side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Home,
    Draw,
    Visitor,
}

impl MatchResult {
    /// Classify a full-time score.
    pub fn from_score(home_goals: u32, away_goals: u32) -> Self {
        match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => MatchResult::Home,
            std::cmp::Ordering::Less => MatchResult::Visitor,
            std::cmp::Ordering::Equal => MatchResult::Draw,
        }
    }

    pub fn all() -> [MatchResult; 3] {
        [MatchResult::Draw, MatchResult::Home, MatchResult::Visitor]
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Home => write!(f, "home"),
            MatchResult::Draw => write!(f, "draw"),
            MatchResult::Visitor => write!(f, "visitor"),
        }
    }
}

/// One row of the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Fixture identifier (season + date + teams)
    pub id: MatchId,

    /// 1-based data row number in the source file (header excluded)
    pub row: usize,

    /// Division code, when the file carries one
    pub division: Option<String>,

    /// Season label, e.g. "2000-01"
    pub season: String,

    pub date: NaiveDate,

    pub home_team: String,

    pub away_team: String,

    /// Full-time goals. `None` only when the cell was blank in the source.
    pub full_time_home_goals: Option<u32>,
    pub full_time_away_goals: Option<u32>,

    /// Half-time goals, not recorded for the earliest seasons.
    pub half_time_home_goals: Option<u32>,
    pub half_time_away_goals: Option<u32>,
}

impl MatchRecord {
    /// Create a record with full-time goals and no half-time score.
    pub fn new(
        row: usize,
        season: impl Into<String>,
        date: NaiveDate,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        full_time_home_goals: u32,
        full_time_away_goals: u32,
    ) -> Self {
        let season = season.into();
        let home_team = home_team.into();
        let away_team = away_team.into();
        let id = MatchId::generate(&season, date, &home_team, &away_team);

        Self {
            id,
            row,
            division: None,
            season,
            date,
            home_team,
            away_team,
            full_time_home_goals: Some(full_time_home_goals),
            full_time_away_goals: Some(full_time_away_goals),
            half_time_home_goals: None,
            half_time_away_goals: None,
        }
    }

    /// Set the half-time score.
    pub fn with_half_time(mut self, home_goals: u32, away_goals: u32) -> Self {
        self.half_time_home_goals = Some(home_goals);
        self.half_time_away_goals = Some(away_goals);
        self
    }

    /// Whether both half-time fields are present.
    pub fn has_half_time(&self) -> bool {
        self.half_time_home_goals.is_some() && self.half_time_away_goals.is_some()
    }
}

/// A match with its derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: MatchId,
    pub season: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub result: MatchResult,
    pub total_goals: u32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Day of week, 0 = Monday
    pub weekday: u32,
}

/// The loaded results file. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    records: Vec<MatchRecord>,
}

impl MatchTable {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Season labels in the order they first appear.
    pub fn seasons(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.season.as_str()))
            .map(|r| r.season.as_str())
            .collect()
    }

    /// Distinct home team names in the order they first appear.
    pub fn unique_home_teams(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.home_team.as_str()))
            .map(|r| r.home_team.as_str())
            .collect()
    }

    /// Rows without a complete half-time score.
    pub fn missing_half_time(&self) -> usize {
        self.records.iter().filter(|r| !r.has_half_time()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_result_from_score() {
        assert_eq!(MatchResult::from_score(3, 1), MatchResult::Home);
        assert_eq!(MatchResult::from_score(0, 2), MatchResult::Visitor);
        assert_eq!(MatchResult::from_score(2, 2), MatchResult::Draw);
        assert_eq!(MatchResult::from_score(0, 0), MatchResult::Draw);
    }

    #[test]
    fn test_result_display_and_serde() {
        assert_eq!(MatchResult::Visitor.to_string(), "visitor");
        assert_eq!(
            serde_json::to_string(&MatchResult::Home).unwrap(),
            "\"home\""
        );
    }

    #[test]
    fn test_record_new_generates_id() {
        let r = MatchRecord::new(1, "1995-96", date(1995, 8, 19), "Arsenal", "Middlesbrough", 1, 1);
        assert_eq!(
            r.id,
            MatchId::generate("1995-96", date(1995, 8, 19), "Arsenal", "Middlesbrough")
        );
        assert!(!r.has_half_time());
        assert!(r.with_half_time(0, 1).has_half_time());
    }

    #[test]
    fn test_table_seasons_and_teams_first_seen() {
        let table = MatchTable::new(vec![
            MatchRecord::new(1, "1994-95", date(1994, 8, 20), "Leeds", "West Ham", 0, 0),
            MatchRecord::new(2, "1993-94", date(1993, 8, 14), "Arsenal", "Coventry", 0, 3),
            MatchRecord::new(3, "1994-95", date(1994, 8, 20), "Arsenal", "Leeds", 2, 1),
        ]);

        assert_eq!(table.seasons(), vec!["1994-95", "1993-94"]);
        assert_eq!(table.unique_home_teams(), vec!["Leeds", "Arsenal"]);
        assert_eq!(table.missing_half_time(), 3);
        assert_eq!(table.len(), 3);
    }
}
