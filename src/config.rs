//! Harvest configuration.
//!
//! Settings come from three layers, later ones winning:
//! 1. built-in defaults ([`HarvestConfig::default`])
//! 2. an optional YAML file
//! 3. command-line flags and environment variables ([`Cli`])
//!
//! # Example file
//!
//! ```yaml
//! target: 5000
//! base_url: https://www.ixbt.com
//! database: articles.db
//! progress_every: 10
//! index_delay_ms: 500
//! article_delay_min_ms: 200
//! article_delay_max_ms: 400
//! request_timeout_secs: 10
//! ```

use crate::cli::Cli;
use crate::fetch::DEFAULT_USER_AGENT;
use crate::utils::Pacing;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a harvest run needs to know.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    /// Stop once the store holds this many articles.
    pub target: u64,
    /// Origin of the news archive.
    pub base_url: String,
    /// SQLite database file.
    pub database: PathBuf,
    /// First day to scan; today when unset.
    pub start_date: Option<NaiveDate>,
    /// Log progress every N stored articles.
    pub progress_every: u64,
    pub index_delay_ms: u64,
    pub article_delay_min_ms: u64,
    pub article_delay_max_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            target: 5000,
            base_url: "https://www.ixbt.com".to_string(),
            database: PathBuf::from("articles.db"),
            start_date: None,
            progress_every: 10,
            index_delay_ms: pacing.index_delay.as_millis() as u64,
            article_delay_min_ms: pacing.article_delay_min.as_millis() as u64,
            article_delay_max_ms: pacing.article_delay_max.as_millis() as u64,
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HarvestConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(target) = cli.target {
            self.target = target;
        }
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(database) = &cli.database {
            self.database = database.clone();
        }
        if cli.start_date.is_some() {
            self.start_date = cli.start_date;
        }
        if let Some(every) = cli.progress_every {
            self.progress_every = every;
        }
    }

    /// Check invariants and return the parsed archive origin.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.target == 0 {
            return Err(ConfigError::Invalid("target must be at least 1".into()));
        }
        if self.progress_every == 0 {
            return Err(ConfigError::Invalid("progress_every must be at least 1".into()));
        }
        if self.article_delay_min_ms > self.article_delay_max_ms {
            return Err(ConfigError::Invalid(format!(
                "article_delay_min_ms ({}) exceeds article_delay_max_ms ({})",
                self.article_delay_min_ms, self.article_delay_max_ms
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }

        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::BaseUrl {
                url: self.base_url.clone(),
                reason: "expected an absolute http(s) URL".into(),
            });
        }
        Ok(url)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            index_delay: Duration::from_millis(self.index_delay_ms),
            article_delay_min: Duration::from_millis(self.article_delay_min_ms),
            article_delay_max: Duration::from_millis(self.article_delay_max_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load a YAML config file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<HarvestConfig, ConfigError> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let config = HarvestConfig::from_yaml(&yaml)?;
    info!("Loaded configuration");
    Ok(config)
}

/// Build the effective configuration from the command line.
pub async fn resolve(cli: &Cli) -> Result<HarvestConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path).await?,
        None => HarvestConfig::default(),
    };
    config.apply_cli(cli);
    Ok(config)
}
