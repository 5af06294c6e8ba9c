//! Utility functions for request pacing and log formatting.
//!
//! This module provides helpers used throughout the application:
//! - [`Pacing`]: the pre-fetch delays that bound our request rate
//! - String truncation for log lines

use rand::{Rng, rng};
use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;

/// Pre-fetch delays applied before every request.
///
/// Load is self-generated and strictly serial, so a sleep before each fetch
/// is all the rate limiting the crawl needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Fixed delay before each archive index fetch.
    pub index_delay: Duration,
    /// Lower bound of the random delay before each article fetch.
    pub article_delay_min: Duration,
    /// Upper bound of the random delay before each article fetch.
    pub article_delay_max: Duration,
}

impl Pacing {
    /// No delays at all. Used by tests.
    pub const NONE: Pacing = Pacing {
        index_delay: Duration::ZERO,
        article_delay_min: Duration::ZERO,
        article_delay_max: Duration::ZERO,
    };

    /// Sleep the fixed index delay.
    pub async fn before_index(&self) {
        pause(self.index_delay).await;
    }

    /// Sleep a random duration in `[article_delay_min, article_delay_max]`.
    pub async fn before_article(&self) {
        pause(self.article_delay()).await;
    }

    /// Draw one article delay.
    pub fn article_delay(&self) -> Duration {
        let lo = self.article_delay_min.as_millis() as u64;
        let hi = self.article_delay_max.as_millis() as u64;
        if hi <= lo {
            return self.article_delay_min;
        }
        Duration::from_millis(rng().random_range(lo..=hi))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            index_delay: Duration::from_millis(500),
            article_delay_min: Duration::from_millis(200),
            article_delay_max: Duration::from_millis(400),
        }
    }
}

async fn pause(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    trace!(?delay, "Pausing before fetch");
    sleep(delay).await;
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis appended.
/// Counts characters, not bytes, so Cyrillic titles never split mid-codepoint.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("Привет, мир", 6), "Привет…");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}…", &s[..byte_idx]),
    }
}
