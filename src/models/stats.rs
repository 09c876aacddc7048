//! Derived statistics models.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{compare_seasons, MatchResult};

/// Which side of a fixture a team played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// The result that counts as a win for this side.
    pub fn winning_result(&self) -> MatchResult {
        match self {
            Side::Home => MatchResult::Home,
            Side::Away => MatchResult::Visitor,
        }
    }
}

/// Counts of each match outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCounts {
    pub home: u32,
    pub draw: u32,
    pub visitor: u32,
}

impl ResultCounts {
    pub fn get(&self, result: MatchResult) -> u32 {
        match result {
            MatchResult::Home => self.home,
            MatchResult::Draw => self.draw,
            MatchResult::Visitor => self.visitor,
        }
    }
}

/// Wins for one team in one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonTeamRecord {
    pub season: String,
    pub team: String,
    pub home_wins: u32,
    pub visitor_wins: u32,
    pub total_wins: u32,
}

impl SeasonTeamRecord {
    pub fn new(season: String, team: String, home_wins: u32, visitor_wins: u32) -> Self {
        Self {
            season,
            team,
            home_wins,
            visitor_wins,
            total_wins: home_wins + visitor_wins,
        }
    }
}

/// Career win totals for one team, summed over all seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWinTotals {
    pub team: String,
    pub total_wins: u32,
    pub home_wins: u32,
    pub visitor_wins: u32,
}

/// Dense team x season grid of total wins.
///
/// Rows are ordered by descending career wins (ties keep the order in which
/// teams were first seen). Columns are seasons in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSeasonMatrix {
    pub teams: Vec<String>,
    pub seasons: Vec<String>,
    /// `cells[row][col]`, one row per team, one column per season
    pub cells: Vec<Vec<u32>>,
}

impl TeamSeasonMatrix {
    fn team_index(&self, team: &str) -> Option<usize> {
        self.teams.iter().position(|t| t == team)
    }

    fn season_index(&self, season: &str) -> Option<usize> {
        self.seasons.iter().position(|s| s == season)
    }

    /// Wins for a (team, season) pair. `None` only if either label is unknown.
    pub fn get(&self, team: &str, season: &str) -> Option<u32> {
        let row = self.team_index(team)?;
        let col = self.season_index(season)?;
        Some(self.cells[row][col])
    }

    pub fn max_value(&self) -> u32 {
        self.cells
            .iter()
            .flat_map(|r| r.iter().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Long-form (team, season, wins) triples, row by row.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.teams.iter().enumerate().flat_map(move |(i, team)| {
            self.seasons
                .iter()
                .enumerate()
                .map(move |(j, season)| (team.as_str(), season.as_str(), self.cells[i][j]))
        })
    }
}

/// Grouping used for distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Season,
    /// Season and home team
    SeasonTeam,
    Month,
    Weekday,
}

/// A group key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Season(String),
    SeasonTeam { season: String, team: String },
    Month(u32),
    Weekday(u32),
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

impl GroupKey {
    /// Human-readable label for charts.
    pub fn label(&self) -> String {
        match self {
            GroupKey::Season(s) => s.clone(),
            GroupKey::SeasonTeam { season, team } => format!("{} {}", season, team),
            GroupKey::Month(m) => MONTHS
                .get((*m as usize).wrapping_sub(1))
                .map(|s| s.to_string())
                .unwrap_or_else(|| m.to_string()),
            GroupKey::Weekday(d) => WEEKDAYS
                .get(*d as usize)
                .map(|s| format!("{} ({})", s, d))
                .unwrap_or_else(|| d.to_string()),
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        use GroupKey::*;
        match (self, other) {
            (Season(a), Season(b)) => compare_seasons(a, b),
            (
                SeasonTeam { season: a, team: x },
                SeasonTeam { season: b, team: y },
            ) => compare_seasons(a, b).then_with(|| x.cmp(y)),
            (Month(a), Month(b)) => a.cmp(b),
            (Weekday(a), Weekday(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl GroupKey {
    fn rank(&self) -> u8 {
        match self {
            GroupKey::Season(_) => 0,
            GroupKey::SeasonTeam { .. } => 1,
            GroupKey::Month(_) => 2,
            GroupKey::Weekday(_) => 3,
        }
    }
}

/// Row count, sum and mean of a value within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    pub key: GroupKey,
    pub count: u32,
    pub sum: f64,
    pub mean: f64,
}

/// Five-number summary of a value within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadStat {
    pub key: GroupKey,
    pub count: u32,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Average per-season wins on one side for a team.
///
/// `count` is the number of fixtures the team played on that side and `mean`
/// averages, over those fixtures, the team's wins on that side in the
/// fixture's season. Seasons with more fixtures therefore weigh more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWinAverage {
    pub team: String,
    pub side: Side,
    pub count: u32,
    pub mean: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_team_record_total() {
        let r = SeasonTeamRecord::new("2001-02".into(), "Arsenal".into(), 12, 14);
        assert_eq!(r.total_wins, 26);
    }

    #[test]
    fn test_matrix_lookup() {
        let m = TeamSeasonMatrix {
            teams: vec!["A".into(), "B".into()],
            seasons: vec!["2000-01".into(), "2001-02".into()],
            cells: vec![vec![3, 0], vec![1, 2]],
        };

        assert_eq!(m.get("A", "2001-02"), Some(0));
        assert_eq!(m.get("B", "2000-01"), Some(1));
        assert_eq!(m.get("C", "2000-01"), None);
        assert_eq!(m.max_value(), 3);
        assert_eq!(m.entries().count(), 4);
    }

    #[test]
    fn test_group_key_order_and_label() {
        let mut keys = vec![
            GroupKey::Season("2000-01".into()),
            GroupKey::Season("1999-00".into()),
        ];
        keys.sort();
        assert_eq!(keys[0], GroupKey::Season("1999-00".into()));

        assert_eq!(GroupKey::Month(8).label(), "Aug");
        assert_eq!(GroupKey::Weekday(5).label(), "Sat (5)");
        assert_eq!(GroupKey::Month(13).label(), "13");
    }

    #[test]
    fn test_side_winning_result() {
        assert_eq!(Side::Home.winning_result(), MatchResult::Home);
        assert_eq!(Side::Away.winning_result(), MatchResult::Visitor);
    }
}
