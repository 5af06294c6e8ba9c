//! Test doubles shared by the unit tests.

use crate::fetch::{Fetch, FetchError};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned pages by exact URL and records every request.
///
/// Unknown URLs answer with `404 Not Found`.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requests.lock().unwrap().iter().any(|u| u == url)
    }
}

impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(StatusCode::NOT_FOUND))
    }
}

/// A minimal article page using the semantic `articleBody` layout.
pub fn article_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <h1>{title}</h1>
        <div itemprop="articleBody"><p>{body}</p></div>
        </body></html>"#
    )
}

/// An archive index page linking to every `href` given.
pub fn index_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|h| format!(r#"<li><a href="{h}">link</a></li>"#))
        .collect();
    format!("<html><body><ul>{anchors}</ul></body></html>")
}
