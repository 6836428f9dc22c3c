//! Test utilities: mock implementations of the core traits and canned
//! MediaWiki response bodies.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::locator::PageIdentity;
use crate::models::TableRecord;
use crate::traits::{Fetcher, TableParser};

pub const TEST_PAGE_URL: &str = "https://en.wikipedia.org/wiki/List_of_metropolitan_areas_in_Asia";
pub const TEST_PAGE_TITLE: &str = "List of metropolitan areas in Asia";

pub fn test_page() -> PageIdentity {
    PageIdentity::new(TEST_PAGE_URL).unwrap()
}

// ---------------------------------------------------------------------------
// Canned API bodies
// ---------------------------------------------------------------------------

/// `action=query&list=search` body listing the given titles in order.
pub fn search_body(titles: &[&str]) -> String {
    let hits: Vec<_> = titles
        .iter()
        .map(|title| serde_json::json!({"ns": 0, "title": title}))
        .collect();
    serde_json::json!({"batchcomplete": "", "query": {"search": hits}}).to_string()
}

/// `action=parse&prop=sections` body with `(anchor, index)` pairs.
pub fn sections_body(sections: &[(&str, &str)]) -> String {
    let sections: Vec<_> = sections
        .iter()
        .map(|(anchor, index)| {
            serde_json::json!({"toclevel": 1, "line": anchor, "index": index, "anchor": anchor})
        })
        .collect();
    serde_json::json!({"parse": {"title": TEST_PAGE_TITLE, "sections": sections}}).to_string()
}

/// `action=parse&section=N` body wrapping an HTML fragment.
pub fn content_body(html: &str) -> String {
    serde_json::json!({"parse": {"title": TEST_PAGE_TITLE, "text": {"*": html}}}).to_string()
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that replays a queue of responses and records requested URLs.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns an HTTP error.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(body: &str) -> Self {
        Self::with_responses(vec![Ok(body.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Responses for a full successful run: search hit, sections, content.
    pub fn for_pipeline(anchor: &str, index: &str, html: &str) -> Self {
        Self::with_responses(vec![
            Ok(search_body(&[TEST_PAGE_TITLE])),
            Ok(sections_body(&[("Overview", "1"), (anchor, index)])),
            Ok(content_body(html)),
        ])
    }

    /// URLs requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(AppError::HttpError(format!("no mock response for {url}")))
        } else {
            responses.remove(0)
        }
    }
}

/// Fetcher whose requests never complete, for timeout tests.
#[derive(Clone)]
pub struct PendingFetcher;

impl Fetcher for PendingFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, AppError> {
        std::future::pending().await
    }
}

// ---------------------------------------------------------------------------
// MockTableParser
// ---------------------------------------------------------------------------

/// Mock parser that returns fixed records and records the fragments it saw.
#[derive(Clone)]
pub struct MockTableParser {
    records: Vec<TableRecord>,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl MockTableParser {
    pub fn new(records: Vec<TableRecord>) -> Self {
        Self {
            records,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl TableParser for MockTableParser {
    fn parse(&self, html: &str, _page: &PageIdentity) -> Vec<TableRecord> {
        self.seen.lock().unwrap().push(html.to_string());
        self.records.clone()
    }
}
