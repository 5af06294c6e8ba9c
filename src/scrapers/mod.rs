//! Scrapers for the date-organized news archive.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Indexing**: [`archive::discover`] lists the article URLs of one day
//! 2. **Extraction**: [`article::extract`] turns one URL into an article record
//!
//! # Supported layouts
//!
//! | Layout | Marker | Notes |
//! |--------|--------|-------|
//! | Current | `div[itemprop="articleBody"]` | schema.org microdata |
//! | Legacy A | `div.b-article__content` | older template |
//! | Legacy B | `div.post-content` | oldest template |
//!
//! Both phases sleep before fetching and never return an error: a failed
//! index is an empty day, a failed article is a dropped candidate.

pub mod archive;
pub mod article;
pub mod jsonld;
pub mod layout;
