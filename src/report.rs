//! The full analysis report.
//!
//! A [`Report`] holds every derived view of one results file. It is built
//! once from the loaded table and then rendered section by section.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{self, CalculateError};
use crate::models::{
    GroupBy, GroupStat, MatchResult, MatchTable, ResultCounts, ScoredMatch, SeasonTeamRecord,
    Side, SpreadStat, TeamSeasonMatrix, TeamWinAverage, TeamWinTotals,
};
use crate::render;

/// Report errors.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Unknown report section: {0}")]
    UnknownSection(String),
}

/// A renderable part of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Summary,
    Results,
    SeasonGoals,
    SeasonAverage,
    Months,
    Weekdays,
    MonthSpread,
    WeekdaySpread,
    HomeLeaders,
    AwayLeaders,
    SeasonWins,
    Heatmap,
    DotPlot,
}

impl Section {
    pub fn all() -> &'static [Section] {
        &[
            Section::Summary,
            Section::Results,
            Section::SeasonGoals,
            Section::SeasonAverage,
            Section::Months,
            Section::Weekdays,
            Section::MonthSpread,
            Section::WeekdaySpread,
            Section::HomeLeaders,
            Section::AwayLeaders,
            Section::SeasonWins,
            Section::Heatmap,
            Section::DotPlot,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Section::Summary => "summary",
            Section::Results => "results",
            Section::SeasonGoals => "season-goals",
            Section::SeasonAverage => "season-average",
            Section::Months => "months",
            Section::Weekdays => "weekdays",
            Section::MonthSpread => "month-spread",
            Section::WeekdaySpread => "weekday-spread",
            Section::HomeLeaders => "home-leaders",
            Section::AwayLeaders => "away-leaders",
            Section::SeasonWins => "season-wins",
            Section::Heatmap => "heatmap",
            Section::DotPlot => "dot-plot",
        }
    }

    /// Parse a comma-separated list such as "results,heatmap".
    pub fn parse_list(s: &str) -> Result<Vec<Section>, ReportError> {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Section::from_str)
            .collect()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Section {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Section::all()
            .iter()
            .copied()
            .find(|section| section.name() == wanted)
            .ok_or_else(|| ReportError::UnknownSection(s.to_string()))
    }
}

/// Options that shape the report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Rows kept in the home/away leader tables
    pub top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

/// Table-level counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub matches: usize,
    pub seasons: usize,
    pub unique_teams: usize,
    pub missing_half_time: usize,
}

/// Every derived view of one results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub totals: Totals,
    pub result_counts: ResultCounts,
    /// Match count, total and mean goals per season
    pub season_goals: Vec<GroupStat>,
    pub month_games: Vec<GroupStat>,
    pub weekday_games: Vec<GroupStat>,
    pub month_spread: Vec<SpreadStat>,
    pub weekday_spread: Vec<SpreadStat>,
    pub home_leaders: Vec<TeamWinAverage>,
    pub away_leaders: Vec<TeamWinAverage>,
    pub season_team_wins: Vec<SeasonTeamRecord>,
    pub team_totals: Vec<TeamWinTotals>,
    pub matrix: TeamSeasonMatrix,
}

impl Report {
    /// Score the table and build every view.
    pub fn build(table: &MatchTable, options: &ReportOptions) -> Result<Self, CalculateError> {
        let scored = calculate::score_matches(table)?;
        Ok(Self::from_scored(table, &scored, options))
    }

    /// Build every view from already-scored matches.
    pub fn from_scored(table: &MatchTable, scored: &[ScoredMatch], options: &ReportOptions) -> Self {
        debug!("Building report from {} scored matches", scored.len());

        let season_team_wins = calculate::aggregate_by_season_team(scored);
        let team_totals = calculate::team_win_totals(&season_team_wins);
        let matrix = calculate::build_team_season_matrix(&season_team_wins);

        let report = Self {
            totals: Totals {
                matches: table.len(),
                seasons: table.seasons().len(),
                unique_teams: calculate::unique_team_count(table),
                missing_half_time: table.missing_half_time(),
            },
            result_counts: calculate::result_counts(scored),
            season_goals: calculate::compute_distribution(scored, GroupBy::Season),
            month_games: calculate::compute_distribution(scored, GroupBy::Month),
            weekday_games: calculate::compute_distribution(scored, GroupBy::Weekday),
            month_spread: calculate::goal_spread(scored, GroupBy::Month),
            weekday_spread: calculate::goal_spread(scored, GroupBy::Weekday),
            home_leaders: calculate::team_win_averages(scored, Side::Home, options.top_n),
            away_leaders: calculate::team_win_averages(scored, Side::Away, options.top_n),
            season_team_wins,
            team_totals,
            matrix,
        };

        info!(
            "Report covers {} matches, {} seasons, {} teams",
            report.totals.matches, report.totals.seasons, report.totals.unique_teams
        );
        report
    }

    /// Render the requested sections in the given order.
    pub fn render<W: Write>(&self, out: &mut W, sections: &[Section], width: usize) -> io::Result<()> {
        for section in sections {
            self.render_section(out, *section, width)?;
        }
        Ok(())
    }

    fn render_section<W: Write>(&self, out: &mut W, section: Section, width: usize) -> io::Result<()> {
        match section {
            Section::Summary => self.render_summary(out),
            Section::Results => {
                let items: Vec<(String, u32)> = MatchResult::all()
                    .iter()
                    .map(|r| (r.to_string(), self.result_counts.get(*r)))
                    .collect();
                render::pie(out, "Match results", &items, width)
            }
            Section::SeasonGoals => {
                render::line(out, "Total goals per season", &series(&self.season_goals, |g| g.sum))
            }
            Section::SeasonAverage => render::bar(
                out,
                "Avg. goals per game per season",
                &series(&self.season_goals, |g| g.mean),
                width,
            ),
            Section::Months => render::bar(
                out,
                "Games per month",
                &series(&self.month_games, |g| g.count as f64),
                width,
            ),
            Section::Weekdays => render::bar(
                out,
                "Games per weekday (0 = Monday)",
                &series(&self.weekday_games, |g| g.count as f64),
                width,
            ),
            Section::MonthSpread => {
                render::box_plot(out, "Goals per game by month", &self.month_spread, width)
            }
            Section::WeekdaySpread => {
                render::box_plot(out, "Goals per game by weekday", &self.weekday_spread, width)
            }
            Section::HomeLeaders => render::table(
                out,
                "Most home wins per season on average",
                &["team", "count", "mean"],
                &leader_rows(&self.home_leaders),
            ),
            Section::AwayLeaders => render::table(
                out,
                "Most away wins per season on average",
                &["team", "count", "mean"],
                &leader_rows(&self.away_leaders),
            ),
            Section::SeasonWins => {
                let rows: Vec<Vec<String>> = self
                    .season_team_wins
                    .iter()
                    .map(|r| {
                        vec![
                            r.season.clone(),
                            r.team.clone(),
                            r.home_wins.to_string(),
                            r.visitor_wins.to_string(),
                            r.total_wins.to_string(),
                        ]
                    })
                    .collect();
                render::table(
                    out,
                    "Wins per team per season",
                    &["season", "team", "home_wins", "visitor_wins", "total_wins"],
                    &rows,
                )
            }
            Section::Heatmap => render::heatmap(out, "Wins per season", &self.matrix),
            Section::DotPlot => render::dot_plot(out, "Wins per team", &self.team_totals, width),
        }
    }

    fn render_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let t = &self.totals;
        let rows = vec![
            vec!["matches".to_string(), t.matches.to_string()],
            vec!["seasons".to_string(), t.seasons.to_string()],
            vec!["teams".to_string(), t.unique_teams.to_string()],
            vec![
                "no half-time score".to_string(),
                t.missing_half_time.to_string(),
            ],
        ];
        render::table(out, "Summary", &["", "count"], &rows)
    }
}

fn series<F>(stats: &[GroupStat], value: F) -> Vec<(String, f64)>
where
    F: Fn(&GroupStat) -> f64,
{
    stats.iter().map(|g| (g.key.label(), value(g))).collect()
}

fn leader_rows(leaders: &[TeamWinAverage]) -> Vec<Vec<String>> {
    leaders
        .iter()
        .map(|l| vec![l.team.clone(), l.count.to_string(), format!("{:.1}", l.mean)])
        .collect()
}
