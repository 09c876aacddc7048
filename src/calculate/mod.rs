//! Statistics calculation engine.
//!
//! Computes derived metrics from loaded match results:
//! - Match outcome, total goals, month and weekday per match
//! - Outcome shares and goal distributions by season, month and weekday
//! - Home and away wins per team per season
//! - The team x season win matrix and career win totals
//!
//! Every function here is pure: it reads its inputs and returns freshly
//! allocated values.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use thiserror::Error;

use crate::models::{
    compare_seasons, GroupBy, GroupKey, GroupStat, MatchRecord, MatchResult, MatchTable,
    ResultCounts, ScoredMatch, SeasonTeamRecord, Side, SpreadStat, TeamSeasonMatrix,
    TeamWinAverage, TeamWinTotals,
};

/// Errors raised while deriving statistics.
#[derive(Debug, Error)]
pub enum CalculateError {
    #[error("Row {row}: missing {field}")]
    MissingData { row: usize, field: &'static str },

    #[error("Row {row}: goal total {home} + {away} overflows")]
    GoalOverflow { row: usize, home: u32, away: u32 },
}

fn full_time_goals(record: &MatchRecord) -> Result<(u32, u32), CalculateError> {
    let home = record
        .full_time_home_goals
        .ok_or(CalculateError::MissingData {
            row: record.row,
            field: "FTHG",
        })?;
    let away = record
        .full_time_away_goals
        .ok_or(CalculateError::MissingData {
            row: record.row,
            field: "FTAG",
        })?;
    Ok((home, away))
}

fn goal_total(record: &MatchRecord, home: u32, away: u32) -> Result<u32, CalculateError> {
    home.checked_add(away).ok_or(CalculateError::GoalOverflow {
        row: record.row,
        home,
        away,
    })
}

/// Outcome of a match from its full-time score.
pub fn classify_result(record: &MatchRecord) -> Result<MatchResult, CalculateError> {
    let (home, away) = full_time_goals(record)?;
    Ok(MatchResult::from_score(home, away))
}

/// Total full-time goals in a match. Missing goals are an error, never zero.
pub fn compute_totals(record: &MatchRecord) -> Result<u32, CalculateError> {
    let (home, away) = full_time_goals(record)?;
    goal_total(record, home, away)
}

/// Derive outcome, total goals, month and weekday for one record.
pub fn score_match(record: &MatchRecord) -> Result<ScoredMatch, CalculateError> {
    let (home_goals, away_goals) = full_time_goals(record)?;

    Ok(ScoredMatch {
        id: record.id.clone(),
        season: record.season.clone(),
        date: record.date,
        home_team: record.home_team.clone(),
        away_team: record.away_team.clone(),
        home_goals,
        away_goals,
        result: MatchResult::from_score(home_goals, away_goals),
        total_goals: goal_total(record, home_goals, away_goals)?,
        month: record.date.month(),
        weekday: record.date.weekday().num_days_from_monday(),
    })
}

/// Score every record in the table, stopping at the first error.
pub fn score_matches(table: &MatchTable) -> Result<Vec<ScoredMatch>, CalculateError> {
    table.iter().map(score_match).collect()
}

/// Count matches by outcome.
pub fn result_counts(matches: &[ScoredMatch]) -> ResultCounts {
    let mut counts = ResultCounts::default();
    for m in matches {
        match m.result {
            MatchResult::Home => counts.home += 1,
            MatchResult::Draw => counts.draw += 1,
            MatchResult::Visitor => counts.visitor += 1,
        }
    }
    counts
}

/// Number of distinct teams that hosted at least one match.
pub fn unique_team_count(table: &MatchTable) -> usize {
    table.unique_home_teams().len()
}

/// Group key of a match under the given grouping.
pub fn group_key(m: &ScoredMatch, by: GroupBy) -> GroupKey {
    match by {
        GroupBy::Season => GroupKey::Season(m.season.clone()),
        GroupBy::SeasonTeam => GroupKey::SeasonTeam {
            season: m.season.clone(),
            team: m.home_team.clone(),
        },
        GroupBy::Month => GroupKey::Month(m.month),
        GroupBy::Weekday => GroupKey::Weekday(m.weekday),
    }
}

/// Collect total goals per group, ordered by key.
fn goals_by_group(matches: &[ScoredMatch], by: GroupBy) -> BTreeMap<GroupKey, Vec<f64>> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for m in matches {
        groups
            .entry(group_key(m, by))
            .or_default()
            .push(m.total_goals as f64);
    }
    groups
}

/// Match count and total-goals sum/mean per group.
pub fn compute_distribution(matches: &[ScoredMatch], by: GroupBy) -> Vec<GroupStat> {
    goals_by_group(matches, by)
        .into_iter()
        .map(|(key, values)| {
            let count = values.len() as u32;
            let sum: f64 = values.iter().sum();
            GroupStat {
                key,
                count,
                sum,
                mean: mean(sum, count),
            }
        })
        .collect()
}

/// Five-number summary of total goals per group.
pub fn goal_spread(matches: &[ScoredMatch], by: GroupBy) -> Vec<SpreadStat> {
    goals_by_group(matches, by)
        .into_iter()
        .map(|(key, mut values)| {
            values.sort_by(f64::total_cmp);
            SpreadStat {
                key,
                count: values.len() as u32,
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect()
}

/// Quantile of sorted values using linear interpolation between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn mean(sum: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Wins on one side per (season, team), in first-seen order.
fn side_wins(matches: &[ScoredMatch], side: Side) -> Vec<((String, String), u32)> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut wins: HashMap<(String, String), u32> = HashMap::new();

    for m in matches {
        let team = match side {
            Side::Home => &m.home_team,
            Side::Away => &m.away_team,
        };
        let key = (m.season.clone(), team.clone());
        let won = u32::from(m.result == side.winning_result());
        match wins.get_mut(&key) {
            Some(count) => *count += won,
            None => {
                wins.insert(key.clone(), won);
                order.push(key);
            }
        }
    }

    order
        .into_iter()
        .map(|key| {
            let count = wins.get(&key).copied().unwrap_or(0);
            (key, count)
        })
        .collect()
}

/// Home and visitor wins for every (season, team) pair.
///
/// Home wins are counted per (season, home team), visitor wins per
/// (season, away team), and the two are joined on (season, team) keeping
/// pairs seen on either side. A pair seen on only one side has zero wins on
/// the other.
pub fn aggregate_by_season_team(matches: &[ScoredMatch]) -> Vec<SeasonTeamRecord> {
    let home = side_wins(matches, Side::Home);
    let away = side_wins(matches, Side::Away);

    let mut order: Vec<(String, String)> = Vec::new();
    let mut joined: HashMap<(String, String), (u32, u32)> = HashMap::new();

    for (key, wins) in home {
        order.push(key.clone());
        joined.insert(key, (wins, 0));
    }
    for (key, wins) in away {
        match joined.get_mut(&key) {
            Some(entry) => entry.1 = wins,
            None => {
                order.push(key.clone());
                joined.insert(key, (0, wins));
            }
        }
    }

    order
        .into_iter()
        .map(|key| {
            let (home_wins, visitor_wins) = joined.get(&key).copied().unwrap_or((0, 0));
            let (season, team) = key;
            SeasonTeamRecord::new(season, team, home_wins, visitor_wins)
        })
        .collect()
}

/// Career win totals per team, highest total first.
///
/// The sort is stable, so teams with equal totals keep first-seen order.
pub fn team_win_totals(records: &[SeasonTeamRecord]) -> Vec<TeamWinTotals> {
    let mut totals: Vec<TeamWinTotals> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for r in records {
        let i = *index.entry(r.team.as_str()).or_insert_with(|| {
            totals.push(TeamWinTotals {
                team: r.team.clone(),
                total_wins: 0,
                home_wins: 0,
                visitor_wins: 0,
            });
            totals.len() - 1
        });
        totals[i].total_wins += r.total_wins;
        totals[i].home_wins += r.home_wins;
        totals[i].visitor_wins += r.visitor_wins;
    }

    totals.sort_by(|a, b| b.total_wins.cmp(&a.total_wins));
    totals
}

/// Pivot season/team records into a dense team x season matrix.
///
/// Rows follow [`team_win_totals`] order; columns are seasons in
/// chronological order. Pairs with no record are 0.
pub fn build_team_season_matrix(records: &[SeasonTeamRecord]) -> TeamSeasonMatrix {
    let teams: Vec<String> = team_win_totals(records)
        .into_iter()
        .map(|t| t.team)
        .collect();

    let mut seasons: Vec<String> = Vec::new();
    let mut wins: HashMap<(&str, &str), u32> = HashMap::new();
    for r in records {
        if !seasons.contains(&r.season) {
            seasons.push(r.season.clone());
        }
        *wins
            .entry((r.team.as_str(), r.season.as_str()))
            .or_insert(0) += r.total_wins;
    }
    seasons.sort_by(|a, b| compare_seasons(a, b));

    let cells = teams
        .iter()
        .map(|team| {
            seasons
                .iter()
                .map(|season| {
                    wins.get(&(team.as_str(), season.as_str()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    TeamSeasonMatrix {
        teams,
        seasons,
        cells,
    }
}

/// Teams with the highest average per-season wins on one side.
///
/// Every fixture a team plays on `side` contributes that team's wins on
/// `side` for the fixture's season. `count` is the number of such fixtures
/// and `mean` their average, rounded to one decimal after ranking. Exact ties
/// are broken alphabetically.
pub fn team_win_averages(matches: &[ScoredMatch], side: Side, top_n: usize) -> Vec<TeamWinAverage> {
    let season_wins: HashMap<(String, String), u32> = side_wins(matches, side).into_iter().collect();

    let mut sums: BTreeMap<&str, (u32, u64)> = BTreeMap::new();
    for m in matches {
        let team = match side {
            Side::Home => m.home_team.as_str(),
            Side::Away => m.away_team.as_str(),
        };
        let wins = season_wins
            .get(&(m.season.clone(), team.to_string()))
            .copied()
            .unwrap_or(0);
        let entry = sums.entry(team).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u64::from(wins);
    }

    // Sort on the unrounded mean; the stable sort keeps exact ties alphabetical.
    let mut averages: Vec<(&str, u32, f64)> = sums
        .into_iter()
        .map(|(team, (count, total))| (team, count, total as f64 / count as f64))
        .collect();
    averages.sort_by(|a, b| b.2.total_cmp(&a.2));
    averages.truncate(top_n);

    averages
        .into_iter()
        .map(|(team, count, mean)| TeamWinAverage {
            team: team.to_string(),
            side,
            count,
            mean: round_to(mean, 1),
        })
        .collect()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
