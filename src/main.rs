//! # News Archive Harvester
//!
//! Builds a corpus of news articles by walking a date-organized web archive
//! backwards from today, extracting each article page into a normalized
//! record, and storing it in SQLite at most once per URL.
//!
//! ## Usage
//!
//! ```sh
//! news_archive_harvester --target 5000 --database articles.db
//! ```
//!
//! ## Architecture
//!
//! The application is a single sequential loop:
//! 1. **Resume**: Count what the store already holds
//! 2. **Indexing**: Fetch the archive index for the current day and keep that day's article links
//! 3. **Extraction**: Fetch each article and extract title, body and publish date
//! 4. **Storage**: Insert the record; a URL already stored is skipped
//! 5. **Advance**: Step one day back, until the target count is reached

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod fetch;
mod harvest;
mod models;
mod scrapers;
mod store;
#[cfg(test)]
mod testing;
mod utils;
mod walker;

use cli::Cli;
use fetch::HttpFetcher;
use harvest::Harvester;
use store::ArticleStore;
use walker::DateWalker;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_archive_harvester starting up");

    // Parse CLI and build the effective config
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = config::resolve(&args).await?;
    let base_url = config.validate()?;
    info!(
        target_count = config.target,
        base_url = %base_url,
        database = %config.database.display(),
        "Configuration resolved"
    );

    // ---- Collaborators ----
    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout())?;
    let store = ArticleStore::open(&config.database).await?;
    debug!(path = %store.path().display(), "Opened article store");
    let walker = config
        .start_date
        .map(DateWalker::new)
        .unwrap_or_else(DateWalker::today);

    // ---- Harvest ----
    let summary = Harvester::new(&fetcher, &store, base_url, config.target)
        .with_pacing(config.pacing())
        .with_progress_every(config.progress_every)
        .run(walker)
        .await?;

    store.close().await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        total = summary.total,
        inserted = summary.inserted(),
        oldest_date = ?summary.oldest_date,
        "Execution complete"
    );

    Ok(())
}
