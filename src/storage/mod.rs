//! Export of derived tables.
//!
//! Writes the derived views of a report to the output directory:
//! - JSON Lines files under `derived/`
//! - Parquet files under `parquet/`
//!
//! Every export rewrites its files from scratch.

pub mod jsonl;
pub mod parquet;

pub use self::jsonl::*;
pub use self::parquet::*;

use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::models::ScoredMatch;
use crate::report::Report;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn derived_dir(&self) -> PathBuf {
        self.output_dir.join("derived")
    }

    pub fn parquet_dir(&self) -> PathBuf {
        self.output_dir.join("parquet")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Rows written per table by [`export_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub scored_matches: usize,
    pub season_team_wins: usize,
    pub team_totals: usize,
    pub matrix_cells: usize,
}

/// Write every derived table as JSONL and Parquet.
pub fn export_report(
    config: &StorageConfig,
    report: &Report,
    scored: &[ScoredMatch],
) -> Result<ExportSummary, StorageError> {
    let matrix_rows: Vec<MatrixCell> = report
        .matrix
        .entries()
        .map(|(team, season, total_wins)| MatrixCell {
            team: team.to_string(),
            season: season.to_string(),
            total_wins,
        })
        .collect();

    let summary = ExportSummary {
        scored_matches: JsonlWriter::for_table(config, DerivedTable::ScoredMatches)
            .write_all(scored)?,
        season_team_wins: JsonlWriter::for_table(config, DerivedTable::SeasonTeamWins)
            .write_all(&report.season_team_wins)?,
        team_totals: JsonlWriter::for_table(config, DerivedTable::TeamTotals)
            .write_all(&report.team_totals)?,
        matrix_cells: JsonlWriter::for_table(config, DerivedTable::TeamSeasonMatrix)
            .write_all(&matrix_rows)?,
    };

    let writer = ParquetWriter::new(config.clone());
    writer.write_scored_matches(scored)?;
    writer.write_season_team_wins(&report.season_team_wins)?;
    writer.write_team_season_matrix(&report.matrix)?;

    info!("Exported derived tables to {:?}", config.output_dir);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchRecord, MatchTable, SeasonTeamRecord, TeamWinTotals};
    use crate::report::ReportOptions;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.derived_dir(), PathBuf::from("/data/derived"));
        assert_eq!(config.parquet_dir(), PathBuf::from("/data/parquet"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_export_report() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());
        let d = NaiveDate::from_ymd_opt(2000, 8, 19).unwrap();
        let table = MatchTable::new(vec![
            MatchRecord::new(1, "2000-01", d, "Arsenal", "Leeds", 2, 0),
            MatchRecord::new(2, "2001-02", d, "Leeds", "Arsenal", 1, 1),
        ]);
        let scored = crate::calculate::score_matches(&table).unwrap();
        let report = Report::from_scored(&table, &scored, &ReportOptions::default());

        let summary = export_report(&config, &report, &scored).unwrap();
        assert_eq!(summary.scored_matches, 2);
        assert_eq!(summary.season_team_wins, 4);
        assert_eq!(summary.team_totals, 2);
        assert_eq!(summary.matrix_cells, 4);

        let wins: Vec<SeasonTeamRecord> =
            JsonlReader::for_table(&config, DerivedTable::SeasonTeamWins)
                .read_all()
                .unwrap();
        assert_eq!(wins, report.season_team_wins);

        let totals: Vec<TeamWinTotals> = JsonlReader::for_table(&config, DerivedTable::TeamTotals)
            .read_all()
            .unwrap();
        assert_eq!(totals[0].team, "Arsenal");

        let reader = ParquetReader::new(config);
        assert_eq!(reader.count(ParquetTable::ScoredMatches).unwrap(), 2);
        assert_eq!(reader.count(ParquetTable::TeamSeasonMatrix).unwrap(), 4);
    }

    #[test]
    fn test_export_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());
        let d = NaiveDate::from_ymd_opt(2000, 8, 19).unwrap();
        let table = MatchTable::new(vec![MatchRecord::new(1, "2000-01", d, "A", "B", 0, 1)]);
        let scored = crate::calculate::score_matches(&table).unwrap();
        let report = Report::from_scored(&table, &scored, &ReportOptions::default());

        export_report(&config, &report, &scored).unwrap();
        let path = jsonl::table_path(&config, DerivedTable::SeasonTeamWins);
        let first = std::fs::read(&path).unwrap();

        export_report(&config, &report, &scored).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }
}
