//! JSONL (JSON Lines) export.
//!
//! Each line is one JSON object representing one row of a derived table.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};

/// Derived tables written as JSONL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedTable {
    ScoredMatches,
    SeasonTeamWins,
    TeamTotals,
    TeamSeasonMatrix,
}

impl DerivedTable {
    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            DerivedTable::ScoredMatches => "scored_matches.jsonl",
            DerivedTable::SeasonTeamWins => "season_team_wins.jsonl",
            DerivedTable::TeamTotals => "team_totals.jsonl",
            DerivedTable::TeamSeasonMatrix => "team_season_matrix.jsonl",
        }
    }
}

/// One cell of the team x season matrix in long form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub team: String,
    pub season: String,
    pub total_wins: u32,
}

/// Path of a derived table's JSONL file.
pub fn table_path(config: &StorageConfig, table: DerivedTable) -> PathBuf {
    config.derived_dir().join(table.filename())
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a derived table.
    pub fn for_table(config: &StorageConfig, table: DerivedTable) -> Self {
        Self::new(table_path(config, table))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write rows, replacing the entire file.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        for row in rows {
            let json = serde_json::to_string(row)?;
            writeln!(writer, "{}", json)?;
        }

        writer.flush()?;
        info!("Wrote {} rows to {:?}", rows.len(), self.path);

        Ok(rows.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a derived table.
    pub fn for_table(config: &StorageConfig, table: DerivedTable) -> Self {
        Self::new(table_path(config, table))
    }

    /// Read all rows. Unparseable lines are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", i + 1, self.path, e);
                }
            }
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cells() -> Vec<MatrixCell> {
        vec![
            MatrixCell {
                team: "Arsenal".to_string(),
                season: "2001-02".to_string(),
                total_wins: 26,
            },
            MatrixCell {
                team: "Ipswich".to_string(),
                season: "2001-02".to_string(),
                total_wins: 9,
            },
        ]
    }

    #[test]
    fn test_derived_table_filename() {
        assert_eq!(
            DerivedTable::SeasonTeamWins.filename(),
            "season_team_wins.jsonl"
        );
        let config = StorageConfig::new(PathBuf::from("/out"));
        assert_eq!(
            table_path(&config, DerivedTable::TeamTotals),
            PathBuf::from("/out/derived/team_totals.jsonl")
        );
    }

    #[test]
    fn test_jsonl_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("cells.jsonl");

        let writer: JsonlWriter<MatrixCell> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&cells()).unwrap(), 2);

        let reader: JsonlReader<MatrixCell> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), cells());
    }

    #[test]
    fn test_jsonl_write_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cells.jsonl");
        let writer: JsonlWriter<MatrixCell> = JsonlWriter::new(path.clone());

        writer.write_all(&cells()).unwrap();
        writer.write_all(&cells()[..1]).unwrap();

        let reader: JsonlReader<MatrixCell> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_jsonl_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cells.jsonl");
        std::fs::write(
            &path,
            "{\"team\":\"A\",\"season\":\"2000-01\",\"total_wins\":3}\nnot json\n\n",
        )
        .unwrap();

        let reader: JsonlReader<MatrixCell> = JsonlReader::new(path);
        let rows = reader.read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_wins, 3);
    }

    #[test]
    fn test_jsonl_read_missing() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<MatrixCell> =
            JsonlReader::new(temp_dir.path().join("nonexistent.jsonl"));

        assert!(matches!(
            reader.read_all(),
            Err(StorageError::PathNotFound(_))
        ));
    }
}
