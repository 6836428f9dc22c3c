use std::time::Duration;

use crate::error::AppError;
use crate::locator::PageIdentity;

pub const DEFAULT_PAGE_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_metropolitan_areas_in_Asia";
pub const DEFAULT_SECTION_ANCHOR: &str = "List";
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 30;

/// Process-wide pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub page: PageIdentity,
    pub section_anchor: String,
    pub stage_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(
        page_url: &str,
        section_anchor: &str,
        stage_timeout_secs: u64,
    ) -> Result<Self, AppError> {
        if section_anchor.trim().is_empty() {
            return Err(AppError::ConfigError(
                "Section anchor must not be empty".into(),
            ));
        }
        if stage_timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "Stage timeout must be at least 1 second".into(),
            ));
        }

        Ok(Self {
            page: PageIdentity::new(page_url)?,
            section_anchor: section_anchor.to_string(),
            stage_timeout: Duration::from_secs(stage_timeout_secs),
        })
    }

    /// Read configuration from environment variables.
    ///
    /// - `METROTABLE_PAGE_URL` (optional, defaults to the Asian metropolitan areas list)
    /// - `METROTABLE_SECTION_ANCHOR` (optional, defaults to `List`)
    /// - `METROTABLE_STAGE_TIMEOUT_SECS` (optional, defaults to 30)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let page_url =
            lookup("METROTABLE_PAGE_URL").unwrap_or_else(|| DEFAULT_PAGE_URL.to_string());
        let anchor = lookup("METROTABLE_SECTION_ANCHOR")
            .unwrap_or_else(|| DEFAULT_SECTION_ANCHOR.to_string());

        let timeout_secs = match lookup("METROTABLE_STAGE_TIMEOUT_SECS") {
            None => DEFAULT_STAGE_TIMEOUT_SECS,
            Some(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid METROTABLE_STAGE_TIMEOUT_SECS '{raw}': must be a positive integer"
                ))
            })?,
        };

        Self::new(&page_url, &anchor, timeout_secs)
    }
}
