//! Date-archive link discovery.
//!
//! The archive publishes one index page per calendar day at
//! `<origin>/news/<yyyy>/<mm>/<dd>/`. This module fetches that page and keeps
//! the links that look like articles from the same day.
//!
//! # Link filter
//!
//! An `href` is kept when it contains `/news/`, the queried `yyyy/mm/dd`, and
//! the `.html` article suffix. The date check is a plain substring match.
//! Relative links resolve against the origin; links to other hosts are dropped.

use crate::fetch::Fetch;
use crate::utils::Pacing;
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

const NEWS_SEGMENT: &str = "/news/";
const ARTICLE_SUFFIX: &str = ".html";

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// `yyyy/mm/dd`, the path fragment identifying one archive day.
pub fn date_path(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Archive index URL for `date`, rooted at the origin of `base`.
pub fn index_url(base: &Url, date: NaiveDate) -> Result<Url, url::ParseError> {
    base.join(&format!("{NEWS_SEGMENT}{}/", date_path(date)))
}

/// Discover article URLs published on `date`.
///
/// Sleeps the fixed index delay, then fetches the day's index page. A failed
/// fetch yields no links: an empty day and an unreachable day look the same.
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn discover<F: Fetch>(fetcher: &F, pacing: &Pacing, base: &Url, date: NaiveDate) -> Vec<String> {
    let url = match index_url(base, date) {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, "Could not build index URL");
            return Vec::new();
        }
    };

    pacing.before_index().await;

    let html = match fetcher.fetch(url.as_str()).await {
        Ok(html) => html,
        Err(e) => {
            debug!(%url, error = %e, "Index fetch failed");
            return Vec::new();
        }
    };

    let links = filter_links(&html, base, date);
    info!(count = links.len(), source = %url, "Indexed archive day");
    links
}

/// Extract the article links for `date` from an index page.
///
/// Order of first appearance is kept; duplicates are removed by exact string
/// equality after resolution.
pub fn filter_links(html: &str, base: &Url, date: NaiveDate) -> Vec<String> {
    let document = Html::parse_document(html);
    let day = date_path(date);
    let Ok(origin) = base.join("/") else {
        return Vec::new();
    };

    document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| is_article_href(href, &day))
        .filter_map(|href| resolve(&origin, href))
        .unique()
        .collect()
}

fn is_article_href(href: &str, day: &str) -> bool {
    href.contains(NEWS_SEGMENT) && href.contains(day) && href.contains(ARTICLE_SUFFIX)
}

fn resolve(origin: &Url, href: &str) -> Option<String> {
    let resolved = origin.join(href.trim()).ok()?;
    if resolved.host_str() != origin.host_str() {
        debug!(%resolved, "Dropping off-site link");
        return None;
    }
    Some(resolved.to_string())
}
