//! Parquet export for analytics tools.
//!
//! Parquet files mirror the JSONL tables and are rewritten on every export.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info};

use super::{StorageConfig, StorageError};
use crate::models::{ScoredMatch, SeasonTeamRecord, TeamSeasonMatrix};

/// Parquet table types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParquetTable {
    ScoredMatches,
    SeasonTeamWins,
    TeamSeasonMatrix,
}

impl ParquetTable {
    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            ParquetTable::ScoredMatches => "scored_matches.parquet",
            ParquetTable::SeasonTeamWins => "season_team_wins.parquet",
            ParquetTable::TeamSeasonMatrix => "team_season_matrix.parquet",
        }
    }
}

/// Schema definitions for Parquet tables.
pub mod schemas {
    use super::*;

    pub fn scored_matches_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("season", DataType::Utf8, false),
            Field::new("date", DataType::Utf8, false),
            Field::new("home_team", DataType::Utf8, false),
            Field::new("away_team", DataType::Utf8, false),
            Field::new("home_goals", DataType::UInt32, false),
            Field::new("away_goals", DataType::UInt32, false),
            Field::new("result", DataType::Utf8, false),
            Field::new("total_goals", DataType::UInt32, false),
            Field::new("month", DataType::UInt32, false),
            Field::new("weekday", DataType::UInt32, false),
        ])
    }

    pub fn season_team_wins_schema() -> Schema {
        Schema::new(vec![
            Field::new("season", DataType::Utf8, false),
            Field::new("team", DataType::Utf8, false),
            Field::new("home_wins", DataType::UInt32, false),
            Field::new("visitor_wins", DataType::UInt32, false),
            Field::new("total_wins", DataType::UInt32, false),
        ])
    }

    /// Long form: one row per (team, season) cell.
    pub fn team_season_matrix_schema() -> Schema {
        Schema::new(vec![
            Field::new("team", DataType::Utf8, false),
            Field::new("season", DataType::Utf8, false),
            Field::new("total_wins", DataType::UInt32, false),
        ])
    }
}

/// Parquet file writer.
pub struct ParquetWriter {
    config: StorageConfig,
}

impl ParquetWriter {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn table_path(&self, table: ParquetTable) -> PathBuf {
        self.config.parquet_dir().join(table.filename())
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write scored matches to Parquet.
    pub fn write_scored_matches(&self, matches: &[ScoredMatch]) -> Result<(), StorageError> {
        let path = self.table_path(ParquetTable::ScoredMatches);
        let schema = Arc::new(schemas::scored_matches_schema());

        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        let seasons: Vec<&str> = matches.iter().map(|m| m.season.as_str()).collect();
        let dates: Vec<String> = matches.iter().map(|m| m.date.to_string()).collect();
        let date_refs: Vec<&str> = dates.iter().map(String::as_str).collect();
        let home_teams: Vec<&str> = matches.iter().map(|m| m.home_team.as_str()).collect();
        let away_teams: Vec<&str> = matches.iter().map(|m| m.away_team.as_str()).collect();
        let home_goals: Vec<u32> = matches.iter().map(|m| m.home_goals).collect();
        let away_goals: Vec<u32> = matches.iter().map(|m| m.away_goals).collect();
        let results: Vec<String> = matches.iter().map(|m| m.result.to_string()).collect();
        let result_refs: Vec<&str> = results.iter().map(String::as_str).collect();
        let total_goals: Vec<u32> = matches.iter().map(|m| m.total_goals).collect();
        let months: Vec<u32> = matches.iter().map(|m| m.month).collect();
        let weekdays: Vec<u32> = matches.iter().map(|m| m.weekday).collect();

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(ids)) as ArrayRef,
                Arc::new(StringArray::from(seasons)) as ArrayRef,
                Arc::new(StringArray::from(date_refs)) as ArrayRef,
                Arc::new(StringArray::from(home_teams)) as ArrayRef,
                Arc::new(StringArray::from(away_teams)) as ArrayRef,
                Arc::new(UInt32Array::from(home_goals)) as ArrayRef,
                Arc::new(UInt32Array::from(away_goals)) as ArrayRef,
                Arc::new(StringArray::from(result_refs)) as ArrayRef,
                Arc::new(UInt32Array::from(total_goals)) as ArrayRef,
                Arc::new(UInt32Array::from(months)) as ArrayRef,
                Arc::new(UInt32Array::from(weekdays)) as ArrayRef,
            ],
        )?;

        self.write_batch(&path, &schema, &batch)?;
        info!("Wrote {} scored matches to {:?}", matches.len(), path);
        Ok(())
    }

    /// Write per-season team wins to Parquet.
    pub fn write_season_team_wins(&self, records: &[SeasonTeamRecord]) -> Result<(), StorageError> {
        let path = self.table_path(ParquetTable::SeasonTeamWins);
        let schema = Arc::new(schemas::season_team_wins_schema());

        let seasons: Vec<&str> = records.iter().map(|r| r.season.as_str()).collect();
        let teams: Vec<&str> = records.iter().map(|r| r.team.as_str()).collect();
        let home_wins: Vec<u32> = records.iter().map(|r| r.home_wins).collect();
        let visitor_wins: Vec<u32> = records.iter().map(|r| r.visitor_wins).collect();
        let total_wins: Vec<u32> = records.iter().map(|r| r.total_wins).collect();

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(seasons)) as ArrayRef,
                Arc::new(StringArray::from(teams)) as ArrayRef,
                Arc::new(UInt32Array::from(home_wins)) as ArrayRef,
                Arc::new(UInt32Array::from(visitor_wins)) as ArrayRef,
                Arc::new(UInt32Array::from(total_wins)) as ArrayRef,
            ],
        )?;

        self.write_batch(&path, &schema, &batch)?;
        info!("Wrote {} season/team rows to {:?}", records.len(), path);
        Ok(())
    }

    /// Write the win matrix to Parquet in long form, row by row.
    pub fn write_team_season_matrix(&self, matrix: &TeamSeasonMatrix) -> Result<(), StorageError> {
        let path = self.table_path(ParquetTable::TeamSeasonMatrix);
        let schema = Arc::new(schemas::team_season_matrix_schema());

        let mut teams: Vec<&str> = Vec::new();
        let mut seasons: Vec<&str> = Vec::new();
        let mut wins: Vec<u32> = Vec::new();
        for (team, season, total) in matrix.entries() {
            teams.push(team);
            seasons.push(season);
            wins.push(total);
        }
        let cells = wins.len();

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(teams)) as ArrayRef,
                Arc::new(StringArray::from(seasons)) as ArrayRef,
                Arc::new(UInt32Array::from(wins)) as ArrayRef,
            ],
        )?;

        self.write_batch(&path, &schema, &batch)?;
        info!("Wrote {} matrix cells to {:?}", cells, path);
        Ok(())
    }

    /// Write a record batch to a Parquet file.
    fn write_batch(
        &self,
        path: &Path,
        schema: &Arc<Schema>,
        batch: &RecordBatch,
    ) -> Result<(), StorageError> {
        self.ensure_dir(path)?;
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;

        Ok(())
    }
}

/// Parquet file reader.
pub struct ParquetReader {
    config: StorageConfig,
}

impl ParquetReader {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn table_path(&self, table: ParquetTable) -> PathBuf {
        self.config.parquet_dir().join(table.filename())
    }

    /// Read all record batches from a Parquet file.
    pub fn read_batches(&self, table: ParquetTable) -> Result<Vec<RecordBatch>, StorageError> {
        let path = self.table_path(table);

        if !path.exists() {
            return Err(StorageError::PathNotFound(path));
        }

        let file = File::open(&path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batches = reader.collect::<Result<Vec<_>, _>>()?;

        debug!("Read {} batches from {:?}", batches.len(), path);
        Ok(batches)
    }

    /// Get row count for a table.
    pub fn count(&self, table: ParquetTable) -> Result<usize, StorageError> {
        let batches = self.read_batches(table)?;
        Ok(batches.iter().map(|b| b.num_rows()).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchId, MatchResult};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> StorageConfig {
        StorageConfig::new(temp_dir.path().to_path_buf())
    }

    #[test]
    fn test_table_filename() {
        assert_eq!(
            ParquetTable::ScoredMatches.filename(),
            "scored_matches.parquet"
        );
        assert_eq!(
            ParquetTable::TeamSeasonMatrix.filename(),
            "team_season_matrix.parquet"
        );
    }

    #[test]
    fn test_schemas() {
        let schema = schemas::scored_matches_schema();
        assert_eq!(schema.fields().len(), 11);
        assert!(schema.field_with_name("weekday").is_ok());

        let schema = schemas::season_team_wins_schema();
        assert_eq!(schema.fields().len(), 5);
        assert!(schema.field_with_name("total_wins").is_ok());
    }

    #[test]
    fn test_write_and_read_scored_matches() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let writer = ParquetWriter::new(config.clone());
        let reader = ParquetReader::new(config);

        let matches = vec![ScoredMatch {
            id: MatchId::from("0123456789abcdef"),
            season: "2000-01".to_string(),
            date: NaiveDate::from_ymd_opt(2000, 8, 19).unwrap(),
            home_team: "Charlton".to_string(),
            away_team: "Man City".to_string(),
            home_goals: 4,
            away_goals: 0,
            result: MatchResult::Home,
            total_goals: 4,
            month: 8,
            weekday: 5,
        }];

        writer.write_scored_matches(&matches).unwrap();

        let batches = reader.read_batches(ParquetTable::ScoredMatches).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 1);
        assert_eq!(batches[0].num_columns(), 11);
    }

    #[test]
    fn test_write_season_team_wins_and_matrix() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let writer = ParquetWriter::new(config.clone());
        let reader = ParquetReader::new(config);

        let records = vec![
            SeasonTeamRecord::new("2000-01".into(), "Arsenal".into(), 15, 5),
            SeasonTeamRecord::new("2000-01".into(), "Leeds".into(), 11, 9),
        ];
        writer.write_season_team_wins(&records).unwrap();
        assert_eq!(reader.count(ParquetTable::SeasonTeamWins).unwrap(), 2);

        let matrix = TeamSeasonMatrix {
            teams: vec!["Arsenal".into(), "Leeds".into()],
            seasons: vec!["2000-01".into()],
            cells: vec![vec![20], vec![20]],
        };
        writer.write_team_season_matrix(&matrix).unwrap();
        assert_eq!(reader.count(ParquetTable::TeamSeasonMatrix).unwrap(), 2);
    }

    #[test]
    fn test_read_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let reader = ParquetReader::new(test_config(&temp_dir));

        assert!(matches!(
            reader.read_batches(ParquetTable::SeasonTeamWins),
            Err(StorageError::PathNotFound(_))
        ));
    }
}
