//! Loading of match results from a CSV file.
//!
//! The file must have a header row with at least `Season`, `Date`, `HomeTeam`,
//! `AwayTeam`, `FTHG` and `FTAG`. `HTHG`, `HTAG` and `Div` are read when
//! present. Other columns are ignored.
//!
//! Loading is all-or-nothing: the first unreadable row aborts the load.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{MatchId, MatchRecord, MatchTable};

/// Columns every results file must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Season", "Date", "HomeTeam", "AwayTeam", "FTHG", "FTAG"];

/// Errors that can occur while loading a results file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Cannot read data source {path:?}: {source}")]
    DataSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Options controlling how rows are parsed.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// chrono format strings tried in order for the `Date` column
    pub date_formats: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
        }
    }
}

/// Day/month/year with two- and four-digit years.
///
/// `%y` goes first: `%Y` would read "14/08/93" as the year 93.
pub fn default_date_formats() -> Vec<String> {
    vec!["%d/%m/%y".to_string(), "%d/%m/%Y".to_string()]
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    season: usize,
    date: usize,
    home_team: usize,
    away_team: usize,
    fthg: usize,
    ftag: usize,
    hthg: Option<usize>,
    htag: Option<usize>,
    division: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}'), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !positions.contains_key(*c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::Schema { missing });
        }

        Ok(Self {
            season: positions["Season"],
            date: positions["Date"],
            home_team: positions["HomeTeam"],
            away_team: positions["AwayTeam"],
            fthg: positions["FTHG"],
            ftag: positions["FTAG"],
            hthg: positions.get("HTHG").copied(),
            htag: positions.get("HTAG").copied(),
            division: positions.get("Div").copied(),
        })
    }
}

/// Load a results file from disk.
pub fn load(path: &Path, options: &IngestOptions) -> Result<MatchTable, IngestError> {
    info!("Loading match results from {:?}", path);

    let file = File::open(path).map_err(|source| IngestError::DataSource {
        path: path.to_path_buf(),
        source,
    })?;

    let table = load_from_reader(file, options).map_err(|e| match e {
        // Surface I/O failures mid-read as source errors, not CSV errors.
        IngestError::Csv(err) if err.is_io_error() => {
            let message = err.to_string();
            IngestError::DataSource {
                path: path.to_path_buf(),
                source: match err.into_kind() {
                    csv::ErrorKind::Io(io) => io,
                    _ => std::io::Error::new(std::io::ErrorKind::Other, message),
                },
            }
        }
        other => other,
    })?;

    info!("Loaded {} matches from {:?}", table.len(), path);
    Ok(table)
}

/// Load results from any reader.
pub fn load_from_reader<R: Read>(
    reader: R,
    options: &IngestOptions,
) -> Result<MatchTable, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;
    debug!("Resolved columns: {:?}", columns);

    let mut records = Vec::new();
    let mut seen: HashMap<MatchId, usize> = HashMap::new();

    for (i, result) in csv_reader.records().enumerate() {
        let row = i + 1;
        let raw = result.map_err(|e| match e.kind() {
            csv::ErrorKind::UnequalLengths { .. } | csv::ErrorKind::Utf8 { .. } => {
                IngestError::MalformedRow {
                    row,
                    reason: e.to_string(),
                }
            }
            _ => IngestError::Csv(e),
        })?;

        let record = parse_row(row, &raw, &columns, options)?;

        if let Some(first) = seen.insert(record.id.clone(), row) {
            warn!(
                "Row {} duplicates row {} ({} v {}, {})",
                row, first, record.home_team, record.away_team, record.date
            );
        }

        records.push(record);
    }

    let table = MatchTable::new(records);
    let missing_half_time = table.missing_half_time();
    if missing_half_time > 0 {
        info!("{} matches have no half-time score", missing_half_time);
    }

    Ok(table)
}

fn parse_row(
    row: usize,
    raw: &csv::StringRecord,
    columns: &ColumnMap,
    options: &IngestOptions,
) -> Result<MatchRecord, IngestError> {
    let field = |idx: usize| raw.get(idx).unwrap_or("").trim();

    let season = required_text(row, "Season", field(columns.season))?;
    let home_team = required_text(row, "HomeTeam", field(columns.home_team))?;
    let away_team = required_text(row, "AwayTeam", field(columns.away_team))?;
    let date = parse_date(row, field(columns.date), &options.date_formats)?;

    let full_time_home_goals = parse_goals(row, "FTHG", field(columns.fthg))?;
    let full_time_away_goals = parse_goals(row, "FTAG", field(columns.ftag))?;
    let half_time_home_goals = match columns.hthg {
        Some(idx) => parse_goals(row, "HTHG", field(idx))?,
        None => None,
    };
    let half_time_away_goals = match columns.htag {
        Some(idx) => parse_goals(row, "HTAG", field(idx))?,
        None => None,
    };
    let division = columns
        .division
        .map(field)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(MatchRecord {
        id: MatchId::generate(&season, date, &home_team, &away_team),
        row,
        division,
        season,
        date,
        home_team,
        away_team,
        full_time_home_goals,
        full_time_away_goals,
        half_time_home_goals,
        half_time_away_goals,
    })
}

fn required_text(row: usize, column: &str, value: &str) -> Result<String, IngestError> {
    if value.is_empty() {
        return Err(IngestError::MalformedRow {
            row,
            reason: format!("empty {}", column),
        });
    }
    Ok(value.to_string())
}

/// Parse a goal count. Blank cells (and pandas-style "NA"/"NaN") are missing.
fn parse_goals(row: usize, column: &str, value: &str) -> Result<Option<u32>, IngestError> {
    if value.is_empty() || value.eq_ignore_ascii_case("na") || value.eq_ignore_ascii_case("nan")
    {
        return Ok(None);
    }

    // Some exports write whole numbers as floats ("2.0").
    let parsed = value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u32)
    });

    parsed.map(Some).ok_or_else(|| IngestError::MalformedRow {
        row,
        reason: format!("{} is not a goal count: {:?}", column, value),
    })
}

fn parse_date(row: usize, value: &str, formats: &[String]) -> Result<NaiveDate, IngestError> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| IngestError::MalformedRow {
            row,
            reason: format!("unrecognised date {:?}", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
Div,Season,Date,HomeTeam,AwayTeam,FTHG,FTAG,HTHG,HTAG
E0,1993-94,14/08/93,Arsenal,Coventry,0,3,,
E0,2000-01,19/08/2000,Charlton,Man City,4,0,2,0
E0,2000-01,20/08/2000,Chelsea,West Ham,4,2,1,0
";

    fn load_str(s: &str) -> Result<MatchTable, IngestError> {
        load_from_reader(s.as_bytes(), &IngestOptions::default())
    }

    #[test]
    fn test_load_sample() {
        let table = load_str(SAMPLE).unwrap();

        assert_eq!(table.len(), 3);
        let first = &table.records()[0];
        assert_eq!(first.row, 1);
        assert_eq!(first.division.as_deref(), Some("E0"));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(1993, 8, 14).unwrap());
        assert_eq!(first.full_time_away_goals, Some(3));
        assert_eq!(first.half_time_home_goals, None);

        let second = &table.records()[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2000, 8, 19).unwrap());
        assert_eq!(second.half_time_home_goals, Some(2));
        assert_eq!(table.missing_half_time(), 1);
    }

    #[test]
    fn test_half_time_columns_optional() {
        let csv = "Season,Date,HomeTeam,AwayTeam,FTHG,FTAG\n2020-21,12/09/2020,Fulham,Arsenal,0,3\n";
        let table = load_str(csv).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.records()[0].division.is_none());
        assert!(!table.records()[0].has_half_time());
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let csv = "Season,Date,HomeTeam,FTHG\n2020-21,12/09/2020,Fulham,0\n";
        match load_str(csv) {
            Err(IngestError::Schema { missing }) => {
                assert_eq!(missing, vec!["AwayTeam".to_string(), "FTAG".to_string()]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_goal_value_is_malformed() {
        let csv = "Season,Date,HomeTeam,AwayTeam,FTHG,FTAG\n2020-21,12/09/2020,Fulham,Arsenal,x,3\n";
        match load_str(csv) {
            Err(IngestError::MalformedRow { row, reason }) => {
                assert_eq!(row, 1);
                assert!(reason.contains("FTHG"));
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_malformed() {
        let csv = "Season,Date,HomeTeam,AwayTeam,FTHG,FTAG\n2020-21,2020-09-12,Fulham,Arsenal,0,3\n";
        assert!(matches!(
            load_str(csv),
            Err(IngestError::MalformedRow { row: 1, .. })
        ));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let csv = "Season,Date,HomeTeam,AwayTeam,FTHG,FTAG\n2020-21,12/09/2020,Fulham\n";
        assert!(matches!(
            load_str(csv),
            Err(IngestError::MalformedRow { row: 1, .. })
        ));
    }

    #[test]
    fn test_blank_full_time_loads_as_missing() {
        let csv = "Season,Date,HomeTeam,AwayTeam,FTHG,FTAG\n2020-21,12/09/2020,Fulham,Arsenal,,3\n";
        let table = load_str(csv).unwrap();
        assert_eq!(table.records()[0].full_time_home_goals, None);
        assert_eq!(table.records()[0].full_time_away_goals, Some(3));
    }

    #[test]
    fn test_float_goals_accepted() {
        assert_eq!(parse_goals(1, "FTHG", "2.0").unwrap(), Some(2));
        assert_eq!(parse_goals(1, "HTHG", "NaN").unwrap(), None);
        assert!(parse_goals(1, "FTHG", "1.5").is_err());
        assert!(parse_goals(1, "FTHG", "-1").is_err());
    }

    #[test]
    fn test_custom_date_format() {
        let csv = "Season,Date,HomeTeam,AwayTeam,FTHG,FTAG\n2020-21,2020-09-12,Fulham,Arsenal,0,3\n";
        let options = IngestOptions {
            date_formats: vec!["%Y-%m-%d".to_string()],
        };
        let table = load_from_reader(csv.as_bytes(), &options).unwrap();
        assert_eq!(
            table.records()[0].date,
            NaiveDate::from_ymd_opt(2020, 9, 12).unwrap()
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let csv = "Season,Date,HomeTeam,AwayTeam,FTHG,FTAG\n\
2020-21,12/09/2020,Fulham,Arsenal,0,3\n\
2020-21,12/09/2020,Fulham,Arsenal,0,3\n";
        let table = load_str(csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].id, table.records()[1].id);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.csv");
        assert!(matches!(
            load(&path, &IngestOptions::default()),
            Err(IngestError::DataSource { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("EPL_Set.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = load(&path, &IngestOptions::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.seasons(), vec!["1993-94", "2000-01"]);
    }
}
