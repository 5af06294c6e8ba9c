//! Command-line interface definitions for the harvester.
//!
//! Every option is an override: anything left unset falls back to the YAML
//! config file (if given) and then to the built-in defaults. Most options can
//! also come from environment variables.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the news archive harvester.
///
/// # Examples
///
/// ```sh
/// # Defaults: 5000 articles from the built-in archive into ./articles.db
/// news_archive_harvester
///
/// # Small run into a separate database, starting from a fixed day
/// news_archive_harvester --target 200 --database /tmp/sample.db --start-date 2024-05-20
///
/// # Everything from a config file
/// news_archive_harvester --config harvest.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of stored articles at which the harvest stops
    #[arg(short, long, env = "HARVEST_TARGET")]
    pub target: Option<u64>,

    /// Origin of the news archive
    #[arg(short, long, env = "HARVEST_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to the SQLite database file
    #[arg(short, long, env = "HARVEST_DATABASE")]
    pub database: Option<PathBuf>,

    /// First (most recent) archive day to scan, as YYYY-MM-DD; defaults to today
    #[arg(short, long)]
    pub start_date: Option<NaiveDate>,

    /// Log a progress line every N stored articles
    #[arg(long)]
    pub progress_every: Option<u64>,
}
