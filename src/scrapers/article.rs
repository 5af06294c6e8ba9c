//! Article page extractor.
//!
//! Turns one article URL into an [`ArticleRecord`], or explains why it could
//! not. Every way a page can fail ends up as an [`Extraction`] variant, so
//! nothing escapes this module as an error.
//!
//! # Extraction steps
//!
//! 1. Randomized pause, then fetch the page
//! 2. Title from the first `h1`
//! 3. Content region from the first matching [`layout`](super::layout) strategy
//! 4. Cleaned body, rejected below [`MIN_BODY_CHARS`] characters
//! 5. Publish date from `meta[itemprop=datePublished]`, then JSON-LD, then today

use super::jsonld;
use super::layout::{clean_text, inline_text, locate_content};
use crate::fetch::{Fetch, FetchError};
use crate::models::{ArticleRecord, MIN_BODY_CHARS};
use crate::utils::Pacing;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::fmt;
use tracing::{debug, instrument};

static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("h1 selector is valid"));

static META_DATE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[itemprop="datePublished"]"#).expect("meta selector is valid")
});

/// Why a fetched page was not accepted as an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotArticle {
    /// No `h1`, or an empty one. Usually an index or redirect page.
    MissingTitle,
    /// None of the known layouts matched.
    MissingContent,
    /// The cleaned body is a stub.
    BodyTooShort { chars: usize },
}

impl fmt::Display for NotArticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotArticle::MissingTitle => write!(f, "no primary heading"),
            NotArticle::MissingContent => write!(f, "no known content layout"),
            NotArticle::BodyTooShort { chars } => {
                write!(f, "body has {chars} characters, need {MIN_BODY_CHARS}")
            }
        }
    }
}

/// Outcome of extracting one URL.
#[derive(Debug)]
pub enum Extraction {
    Article(ArticleRecord),
    NotArticle(NotArticle),
    TransportFailure(FetchError),
}

/// Fetch `url` and extract an article from it.
///
/// Sleeps a random [`Pacing`] article delay first. Failures are logged at
/// debug level and returned as the matching [`Extraction`] variant.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn extract<F: Fetch>(fetcher: &F, pacing: &Pacing, url: &str) -> Extraction {
    pacing.before_article().await;

    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            debug!(error = %e, "Article fetch failed");
            return Extraction::TransportFailure(e);
        }
    };

    match parse_article(&html, url, Local::now().date_naive()) {
        Ok(record) => {
            debug!(chars = record.body.chars().count(), "Extracted article");
            Extraction::Article(record)
        }
        Err(reason) => {
            debug!(%reason, "Not an article");
            Extraction::NotArticle(reason)
        }
    }
}

/// Parse an article page without touching the network.
///
/// `today` is the fallback publish date when the page carries none.
pub fn parse_article(html: &str, url: &str, today: NaiveDate) -> Result<ArticleRecord, NotArticle> {
    let document = Html::parse_document(html);

    let title = document
        .select(&HEADING)
        .next()
        .map(inline_text)
        .filter(|t| !t.is_empty())
        .ok_or(NotArticle::MissingTitle)?;

    let (layout, region) = locate_content(&document).ok_or(NotArticle::MissingContent)?;
    let body = clean_text(region);

    let chars = body.chars().count();
    if chars < MIN_BODY_CHARS {
        return Err(NotArticle::BodyTooShort { chars });
    }
    debug!(layout, chars, "Matched content layout");

    let published_at = published_date(&document).unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    Ok(ArticleRecord::new(title, body, url.to_string(), published_at))
}

fn published_date(document: &Html) -> Option<String> {
    document
        .select(&META_DATE)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
        .or_else(|| jsonld::extract_date_published(document))
}
