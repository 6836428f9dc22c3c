use std::future::Future;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::AppError;
use crate::models::ResultSet;
use crate::traits::{Fetcher, TableParser};
use crate::wiki::WikiClient;

/// Orchestrates the resolution pipeline: page check → section lookup →
/// section fetch → table parse → aggregate.
///
/// Generic over the transport and the parser via traits, so tests run
/// without real HTTP. Every run ends in an explicit `Ok` or `Err`.
pub struct TablePipeline<F, P>
where
    F: Fetcher,
    P: TableParser,
{
    wiki: WikiClient<F>,
    parser: P,
    section_anchor: String,
    stage_timeout: Duration,
}

impl<F, P> TablePipeline<F, P>
where
    F: Fetcher,
    P: TableParser,
{
    pub fn new(fetcher: F, parser: P, config: PipelineConfig) -> Self {
        Self {
            wiki: WikiClient::new(fetcher, config.page),
            parser,
            section_anchor: config.section_anchor,
            stage_timeout: config.stage_timeout,
        }
    }

    /// Run the pipeline once and return the aggregated rows.
    ///
    /// 1. Confirm the page is the first search hit
    /// 2. Resolve the configured anchor to a section index
    /// 3. Fetch that section's rendered markup
    /// 4. Parse the table into records
    /// 5. Wrap them, substituting the sentinel row when empty
    pub async fn run(&self) -> Result<ResultSet, AppError> {
        let page = self.wiki.page();

        // 1. Page
        tracing::info!(page = %page.title(), "Checking page exists");
        if !self.stage("page lookup", self.wiki.page_exists()).await? {
            return Err(AppError::PageNotFound(page.normalized_title()));
        }

        // 2. Section
        let Some(section) = self
            .stage(
                "section lookup",
                self.wiki.locate_section(&self.section_anchor),
            )
            .await?
        else {
            return Err(AppError::SectionNotFound {
                page: page.title(),
                anchor: self.section_anchor.clone(),
            });
        };
        tracing::info!(anchor = %section.anchor, index = section.index, "Section located");

        // 3. Content
        let html = self
            .stage("section content", self.wiki.fetch_section_html(section.index))
            .await?;
        tracing::info!("Fetched {} bytes of section HTML", html.len());

        // 4 & 5. Parse + aggregate
        let records = self.parser.parse(&html, page);
        if records.is_empty() {
            tracing::warn!("Table yielded no data rows");
        } else {
            tracing::info!("Extracted {} records", records.len());
        }

        Ok(ResultSet::from_records(records))
    }

    async fn stage<T>(
        &self,
        name: &'static str,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.stage_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(stage = name, "Stage timed out");
                Err(AppError::Timeout(self.stage_timeout.as_secs()))
            }
        }
    }
}
