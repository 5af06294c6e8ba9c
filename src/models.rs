//! Data models for harvested articles.
//!
//! This module defines the record produced by the extractor and persisted by
//! the store:
//! - [`ArticleRecord`]: a normalized article ready to be written once
//!
//! Records are immutable after construction. The surrogate id and the fetch
//! timestamp are assigned exactly once, in [`ArticleRecord::new`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Minimum number of characters a cleaned body must have to count as an article.
pub const MIN_BODY_CHARS: usize = 50;

/// A normalized news article extracted from one archive page.
///
/// # Fields
///
/// * `id` - Surrogate key, independent of the URL
/// * `title` - Trimmed text of the page's primary heading
/// * `body` - Newline-joined plain text of the content region
/// * `url` - Absolute URL the page was fetched from
/// * `published_at` - Best-effort publish date from page metadata
/// * `fetched_at` - UTC time the page was extracted
/// * `comment_count`, `rating` - Reserved, always zero
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    /// Surrogate identity assigned when the record is accepted.
    pub id: Uuid,
    /// The article headline.
    pub title: String,
    /// Cleaned article text, one paragraph per line.
    pub body: String,
    /// Canonical absolute source URL; unique in the store.
    pub url: String,
    /// Publish date as found on the page, or the extraction date when absent.
    /// Treat as approximate.
    pub published_at: String,
    /// Extraction timestamp; authoritative.
    pub fetched_at: DateTime<Utc>,
    /// Reserved for a later comment scraper.
    pub comment_count: i64,
    /// Reserved for a later rating scraper.
    pub rating: f64,
}

impl ArticleRecord {
    /// Build an accepted record, stamping it with a fresh id and the current time.
    pub fn new(title: String, body: String, url: String, published_at: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            body,
            url,
            published_at,
            fetched_at: Utc::now(),
            comment_count: 0,
            rating: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_zeroed_reserved_fields() {
        let record = ArticleRecord::new(
            "Title".to_string(),
            "Body".to_string(),
            "https://example.com/news/2024/05/20/a.html".to_string(),
            "2024-05-20".to_string(),
        );

        assert_eq!(record.comment_count, 0);
        assert_eq!(record.rating, 0.0);
        assert_eq!(record.url, "https://example.com/news/2024/05/20/a.html");
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = ArticleRecord::new("a".into(), "b".into(), "u".into(), "d".into());
        let b = ArticleRecord::new("a".into(), "b".into(), "u".into(), "d".into());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_fetched_at_follows_construction_order() {
        let first = ArticleRecord::new("a".into(), "b".into(), "u1".into(), "d".into());
        let second = ArticleRecord::new("a".into(), "b".into(), "u2".into(), "d".into());
        assert!(second.fetched_at >= first.fetched_at);
    }
}
