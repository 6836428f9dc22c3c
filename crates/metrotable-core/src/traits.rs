use std::future::Future;

use crate::error::AppError;
use crate::locator::PageIdentity;
use crate::models::TableRecord;

/// Fetches the raw body of a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Turns a rendered section fragment into table records.
///
/// Implementations are pure: the same fragment always yields the same records.
/// Layout anomalies (missing headers, short rows) surface as `None` fields,
/// never as errors.
pub trait TableParser: Send + Sync + Clone {
    fn parse(&self, html: &str, page: &PageIdentity) -> Vec<TableRecord>;
}
