//! # Match Stats
//!
//! Analysis of football match results loaded from a CSV file.
//!
//! ## Architecture
//!
//! - **models**: Match records, outcomes and derived statistics
//! - **ingest**: CSV loading and schema validation
//! - **calculate**: Outcome classification, distributions and win aggregation
//! - **report**: All derived views of one file, rendered by section
//! - **render**: Terminal charts and tables
//! - **storage**: JSONL and Parquet export of derived tables
//! - **config**: Configuration loading and validation
//!
//! The pipeline is a chain of pure functions over an immutable table:
//!
//! ```no_run
//! use match_stats::{ingest, report::{Report, ReportOptions}};
//!
//! let table = ingest::load("EPL_Set.csv".as_ref(), &Default::default())?;
//! let report = Report::build(&table, &ReportOptions::default())?;
//! println!("{} home wins", report.result_counts.home);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod render;
pub mod report;
pub mod storage;

pub use models::*;
