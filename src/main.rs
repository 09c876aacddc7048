use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_stats::calculate;
use match_stats::config::AppConfig;
use match_stats::ingest;
use match_stats::models::MatchTable;
use match_stats::report::{Report, ReportOptions, Section};
use match_stats::storage::{export_report, StorageConfig};

const DEFAULT_CONFIG: &str = "./match-stats.toml";

#[derive(Parser)]
#[command(name = "match-stats")]
#[command(about = "Football match results analysis: outcomes, goal distributions and team wins")]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: ./match-stats.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results CSV to analyse (overrides the config file)
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render charts and tables to the terminal
    Report {
        /// Sections to render (comma-separated), e.g. "results,heatmap"
        #[arg(long)]
        sections: Option<String>,

        /// Rows in the home/away leader tables
        #[arg(long)]
        top: Option<usize>,

        /// Chart width in characters
        #[arg(long)]
        width: Option<usize>,
    },

    /// Write derived tables as JSONL and Parquet
    Export {
        /// Output directory (overrides the config file)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Print headline numbers, or the whole report as JSON
    Summary {
        /// Print the full report as pretty JSON
        #[arg(long)]
        json: bool,
    },

    /// Load and score the results file, reporting the first error
    Validate,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => AppConfig::from_file_or_default(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG))?,
    };

    if let Some(data_file) = &cli.data_file {
        config.data_file = data_file.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    Ok(config)
}

fn init_tracing(log_level: &str, json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn load_table(config: &AppConfig) -> Result<MatchTable> {
    ingest::load(&config.data_file, &config.ingest.options())
        .with_context(|| format!("Failed to load {:?}", config.data_file))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting match-stats v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Report {
            sections,
            top,
            width,
        } => {
            if let Some(top) = top {
                config.report.top_n = top;
            }
            if let Some(width) = width {
                config.report.chart_width = width;
            }
            config.validate()?;

            let sections = match sections {
                Some(list) => Section::parse_list(&list)?,
                None => config.report.sections.clone(),
            };

            let table = load_table(&config)?;
            let report = Report::build(
                &table,
                &ReportOptions {
                    top_n: config.report.top_n,
                },
            )?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            report.render(&mut out, &sections, config.report.chart_width)?;
            out.flush()?;
        }

        Commands::Export { output_dir } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            let table = load_table(&config)?;
            let scored = calculate::score_matches(&table)?;
            let report = Report::from_scored(
                &table,
                &scored,
                &ReportOptions {
                    top_n: config.report.top_n,
                },
            );

            let storage = StorageConfig::new(config.output_dir.clone());
            let summary = export_report(&storage, &report, &scored)
                .with_context(|| format!("Failed to export to {:?}", config.output_dir))?;

            println!("\n=== Export Results ===");
            println!("Scored matches:   {}", summary.scored_matches);
            println!("Season/team rows: {}", summary.season_team_wins);
            println!("Team totals:      {}", summary.team_totals);
            println!("Matrix cells:     {}", summary.matrix_cells);
            println!("Output:           {}", config.output_dir.display());
        }

        Commands::Summary { json } => {
            let table = load_table(&config)?;
            let report = Report::build(
                &table,
                &ReportOptions {
                    top_n: config.report.top_n,
                },
            )?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                report.render(
                    &mut out,
                    &[Section::Summary, Section::Results],
                    config.report.chart_width,
                )?;
            }
            out.flush()?;
        }

        Commands::Validate => {
            let table = load_table(&config)?;
            let scored = calculate::score_matches(&table)?;

            println!("\n=== Validation ===");
            println!("File:               {}", config.data_file.display());
            println!("Matches:            {}", scored.len());
            println!("Seasons:            {}", table.seasons().len());
            println!("No half-time score: {}", table.missing_half_time());
            println!("OK");
        }
    }

    Ok(())
}
