//! The crawl-extract-dedup loop.
//!
//! [`Harvester::run`] walks the archive backwards one day at a time until the
//! store holds the target number of articles:
//!
//! ```text
//! count = store.count()
//! while count < target:
//!     for url in discover(date):
//!         if count >= target: stop
//!         if record = extract(url) and store.insert(record): count += 1
//!     date = date - 1 day
//! ```
//!
//! Everything is strictly sequential: one date at a time, one link at a time.
//! A restarted run begins at the start date again and relies on the store's
//! URL uniqueness to skip what it already has.

use crate::fetch::Fetch;
use crate::scrapers::article::{self, Extraction};
use crate::scrapers::archive;
use crate::store::{ArticleStore, StoreError};
use crate::utils::{Pacing, truncate_for_log};
use crate::walker::DateWalker;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};
use url::Url;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Records already in the store when the run began.
    pub started_with: u64,
    /// Records in the store when the run ended.
    pub total: u64,
    /// Archive days scanned.
    pub dates_scanned: u64,
    /// Candidate links handed to the extractor.
    pub links_tried: u64,
    /// Candidates whose page was not an article.
    pub not_articles: u64,
    /// Candidates whose page could not be fetched.
    pub fetch_failures: u64,
    /// Articles the store refused (already stored, or a write failure).
    pub not_stored: u64,
    /// The oldest day scanned, if any.
    pub oldest_date: Option<NaiveDate>,
}

impl HarvestSummary {
    /// Records added by this run.
    pub fn inserted(&self) -> u64 {
        self.total - self.started_with
    }
}

/// Drives discovery, extraction and storage until the target is met.
#[derive(Debug)]
pub struct Harvester<'a, F> {
    fetcher: &'a F,
    store: &'a ArticleStore,
    base_url: Url,
    target: u64,
    pacing: Pacing,
    progress_every: u64,
}

impl<'a, F: Fetch> Harvester<'a, F> {
    pub fn new(fetcher: &'a F, store: &'a ArticleStore, base_url: Url, target: u64) -> Self {
        Self {
            fetcher,
            store,
            base_url,
            target,
            pacing: Pacing::default(),
            progress_every: 10,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Log a progress line every `every` stored articles. Zero is treated as one.
    pub fn with_progress_every(mut self, every: u64) -> Self {
        self.progress_every = every.max(1);
        self
    }

    /// Harvest from `walker`'s current date backwards until the target is met.
    ///
    /// # Errors
    ///
    /// Only the initial store count can fail the run. Per-link failures are
    /// dropped and the loop continues.
    #[instrument(level = "info", skip_all, fields(target_count = self.target))]
    pub async fn run(&self, mut walker: DateWalker) -> Result<HarvestSummary, StoreError> {
        let started_with = self.store.count().await?;
        let mut summary = HarvestSummary {
            started_with,
            total: started_with,
            ..HarvestSummary::default()
        };

        info!(
            target_count = self.target,
            already_stored = started_with,
            start_date = %walker.current(),
            "Starting harvest"
        );

        while summary.total < self.target {
            let date = walker.current();
            info!(%date, stored = summary.total, "Scanning archive date");

            let links = archive::discover(self.fetcher, &self.pacing, &self.base_url, date).await;
            summary.dates_scanned += 1;
            summary.oldest_date = Some(date);

            if links.is_empty() {
                info!(%date, "No articles found for date; moving on");
            }

            for (i, link) in links.iter().enumerate() {
                if summary.total >= self.target {
                    debug!(skipped = links.len() - i, "Target reached mid-day");
                    break;
                }
                self.harvest_link(link, &mut summary).await;
            }

            walker.advance();
        }

        info!(
            total = summary.total,
            inserted = summary.inserted(),
            dates_scanned = summary.dates_scanned,
            links_tried = summary.links_tried,
            not_articles = summary.not_articles,
            fetch_failures = summary.fetch_failures,
            not_stored = summary.not_stored,
            "Harvest complete"
        );
        Ok(summary)
    }

    async fn harvest_link(&self, url: &str, summary: &mut HarvestSummary) {
        summary.links_tried += 1;

        let record = match article::extract(self.fetcher, &self.pacing, url).await {
            Extraction::Article(record) => record,
            Extraction::NotArticle(reason) => {
                debug!(%url, %reason, "Skipping non-article page");
                summary.not_articles += 1;
                return;
            }
            Extraction::TransportFailure(e) => {
                debug!(%url, error = %e, "Skipping unreachable page");
                summary.fetch_failures += 1;
                return;
            }
        };

        if !self.store.insert(&record).await {
            summary.not_stored += 1;
            return;
        }

        summary.total += 1;
        if summary.total % self.progress_every == 0 {
            info!(
                total = summary.total,
                title = %truncate_for_log(&record.title, 40),
                "Stored article"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticFetcher, article_page, index_page};
    use tempfile::tempdir;

    const BASE: &str = "https://www.ixbt.com";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn article_url(date: NaiveDate, slug: &str) -> String {
        format!("{BASE}/news/{}/{slug}.html", archive::date_path(date))
    }

    fn body(n: usize) -> String {
        format!("Article number {n} has a body that comfortably exceeds the minimum length.")
    }

    /// Two articles on May 20, two on May 19, all extractable.
    fn two_day_archive() -> (StaticFetcher, Vec<String>) {
        let urls = vec![
            article_url(day(20), "a"),
            article_url(day(20), "b"),
            article_url(day(19), "c"),
            article_url(day(19), "d"),
        ];
        let mut fetcher = StaticFetcher::new()
            .with_page(
                format!("{BASE}/news/2024/05/20/"),
                index_page(&["/news/2024/05/20/a.html", "/news/2024/05/20/b.html"]),
            )
            .with_page(
                format!("{BASE}/news/2024/05/19/"),
                index_page(&["/news/2024/05/19/c.html", "/news/2024/05/19/d.html"]),
            );
        for (n, url) in urls.iter().enumerate() {
            fetcher = fetcher.with_page(url.clone(), article_page(&format!("Title {n}"), &body(n)));
        }
        (fetcher, urls)
    }

    #[tokio::test]
    async fn test_stops_mid_day_at_target() {
        let temp_dir = tempdir().unwrap();
        let store = ArticleStore::open(temp_dir.path().join("articles.db")).await.unwrap();
        let (fetcher, urls) = two_day_archive();

        let summary = Harvester::new(&fetcher, &store, Url::parse(BASE).unwrap(), 3)
            .with_pacing(Pacing::NONE)
            .run(DateWalker::new(day(20)))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.inserted(), 3);
        assert_eq!(summary.dates_scanned, 2);
        assert_eq!(summary.oldest_date, Some(day(19)));
        for url in &urls[..3] {
            assert!(fetcher.was_requested(url), "{url} should have been fetched");
        }
        assert!(!fetcher.was_requested(&urls[3]));
    }

    #[tokio::test]
    async fn test_skips_empty_and_failing_days() {
        let temp_dir = tempdir().unwrap();
        let store = ArticleStore::open(temp_dir.path().join("articles.db")).await.unwrap();
        let (fetcher, _) = two_day_archive();

        // May 22 has no index page at all, May 21 lists nothing usable.
        let fetcher = fetcher.with_page(
            format!("{BASE}/news/2024/05/21/"),
            index_page(&["/news/2024/05/21/", "/about.html"]),
        );

        let summary = Harvester::new(&fetcher, &store, Url::parse(BASE).unwrap(), 2)
            .with_pacing(Pacing::NONE)
            .run(DateWalker::new(day(22)))
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.dates_scanned, 3);
        assert_eq!(summary.oldest_date, Some(day(20)));
    }

    #[tokio::test]
    async fn test_rejected_candidates_do_not_count() {
        let temp_dir = tempdir().unwrap();
        let store = ArticleStore::open(temp_dir.path().join("articles.db")).await.unwrap();
        let (_, urls) = two_day_archive();

        // "a" is a stub page, "b" is missing; only May 19 yields articles.
        let fetcher = StaticFetcher::new()
            .with_page(
                format!("{BASE}/news/2024/05/20/"),
                index_page(&["/news/2024/05/20/a.html", "/news/2024/05/20/b.html"]),
            )
            .with_page(
                format!("{BASE}/news/2024/05/19/"),
                index_page(&["/news/2024/05/19/c.html", "/news/2024/05/19/d.html"]),
            )
            .with_page(urls[0].clone(), article_page("Stub", "too short"))
            .with_page(urls[2].clone(), article_page("C", &body(2)))
            .with_page(urls[3].clone(), article_page("D", &body(3)));

        let summary = Harvester::new(&fetcher, &store, Url::parse(BASE).unwrap(), 2)
            .with_pacing(Pacing::NONE)
            .run(DateWalker::new(day(20)))
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.links_tried, 4);
        assert_eq!(summary.not_articles, 1);
        assert_eq!(summary.fetch_failures, 1);
        assert!(store.find_by_url(&urls[0]).await.unwrap().is_none());
        assert!(store.find_by_url(&urls[3]).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_resumed_run_skips_stored_articles() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("articles.db");
        let base = Url::parse(BASE).unwrap();

        {
            let store = ArticleStore::open(&db_path).await.unwrap();
            let (fetcher, _) = two_day_archive();
            Harvester::new(&fetcher, &store, base.clone(), 2)
                .with_pacing(Pacing::NONE)
                .run(DateWalker::new(day(20)))
                .await
                .unwrap();
            store.close().await;
        }

        let store = ArticleStore::open(&db_path).await.unwrap();
        let (fetcher, urls) = two_day_archive();
        let summary = Harvester::new(&fetcher, &store, base, 4)
            .with_pacing(Pacing::NONE)
            .run(DateWalker::new(day(20)))
            .await
            .unwrap();

        // May 20 is rescanned; its articles are refused as duplicates.
        assert_eq!(summary.started_with, 2);
        assert_eq!(summary.not_stored, 2);
        assert_eq!(summary.total, 4);
        assert!(fetcher.was_requested(&urls[0]));
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_store_already_at_target_fetches_nothing() {
        let temp_dir = tempdir().unwrap();
        let store = ArticleStore::open(temp_dir.path().join("articles.db")).await.unwrap();
        let (fetcher, _) = two_day_archive();

        Harvester::new(&fetcher, &store, Url::parse(BASE).unwrap(), 1)
            .with_pacing(Pacing::NONE)
            .run(DateWalker::new(day(20)))
            .await
            .unwrap();
        let requests_after_first = fetcher.requests().len();

        let summary = Harvester::new(&fetcher, &store, Url::parse(BASE).unwrap(), 1)
            .with_pacing(Pacing::NONE)
            .run(DateWalker::new(day(20)))
            .await
            .unwrap();

        assert_eq!(summary.dates_scanned, 0);
        assert_eq!(summary.inserted(), 0);
        assert_eq!(fetcher.requests().len(), requests_after_first);
    }
}
