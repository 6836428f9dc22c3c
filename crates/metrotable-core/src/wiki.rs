use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::locator::PageIdentity;
use crate::models::SectionReference;
use crate::traits::Fetcher;

/// The three MediaWiki API lookups the pipeline needs, bound to one page.
#[derive(Clone)]
pub struct WikiClient<F: Fetcher> {
    fetcher: F,
    page: PageIdentity,
}

// ---- MediaWiki API types ----

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct SectionsResponse {
    parse: SectionsBody,
}

#[derive(Deserialize)]
struct SectionsBody {
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Deserialize)]
struct RawSection {
    #[serde(default)]
    anchor: String,
    index: RawIndex,
}

/// `index` is a string in the legacy format and a number in formatversion=2.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndex {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
struct ContentResponse {
    parse: ContentBody,
}

#[derive(Deserialize)]
struct ContentBody {
    text: ContentText,
}

#[derive(Deserialize)]
struct ContentText {
    #[serde(rename = "*")]
    html: String,
}

#[derive(Deserialize, Default)]
struct ApiErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

impl<F: Fetcher> WikiClient<F> {
    pub fn new(fetcher: F, page: PageIdentity) -> Self {
        Self { fetcher, page }
    }

    pub fn page(&self) -> &PageIdentity {
        &self.page
    }

    /// Check that a search for the page returns it as the very first hit.
    ///
    /// Only index 0 counts; an exact match further down the list is ignored.
    pub async fn page_exists(&self) -> Result<bool, AppError> {
        let expected = self.page.normalized_title();
        let body = self.fetcher.fetch(&self.page.search_url()?).await?;
        let response: SearchResponse = decode(&body, "search")?;

        match response.query.search.first() {
            Some(hit) if hit.title == expected => {
                tracing::debug!(title = %expected, "Searched page exists");
                Ok(true)
            }
            Some(hit) => {
                tracing::info!(
                    expected = %expected,
                    first_hit = %hit.title,
                    "First search hit does not match page title"
                );
                Ok(false)
            }
            None => {
                tracing::info!(title = %expected, "Search returned no results");
                Ok(false)
            }
        }
    }

    /// Find the first section whose anchor equals `anchor` exactly.
    pub async fn locate_section(&self, anchor: &str) -> Result<Option<SectionReference>, AppError> {
        let body = self.fetcher.fetch(&self.page.sections_url()?).await?;
        let response: SectionsResponse = decode(&body, "sections")?;

        let Some(section) = response
            .parse
            .sections
            .into_iter()
            .find(|section| section.anchor == anchor)
        else {
            tracing::info!(anchor, "No section with matching anchor");
            return Ok(None);
        };

        let index = match section.index {
            RawIndex::Number(n) => u32::try_from(n).ok(),
            RawIndex::Text(text) => text.trim().parse::<u32>().ok(),
        }
        .ok_or_else(|| {
            AppError::MalformedResponse(format!(
                "section '{anchor}' has no numeric index"
            ))
        })?;

        tracing::debug!(anchor, index, "Section index resolved");
        Ok(Some(SectionReference {
            anchor: section.anchor,
            index,
        }))
    }

    /// Fetch the rendered HTML fragment of one section.
    pub async fn fetch_section_html(&self, index: u32) -> Result<String, AppError> {
        let body = self
            .fetcher
            .fetch(&self.page.section_content_url(index)?)
            .await?;
        let response: ContentResponse = decode(&body, "section content")?;
        Ok(response.parse.text.html)
    }
}

/// Decode an API body, turning MediaWiki error envelopes and unexpected
/// shapes into typed errors.
fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, AppError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::MalformedResponse(format!("{what}: invalid JSON: {e}")))?;

    if let Some(error) = value.get("error") {
        let detail: ApiErrorDetail = serde_json::from_value(error.clone()).unwrap_or_default();
        return Err(AppError::UpstreamApi {
            code: detail.code,
            info: detail.info,
        });
    }

    serde_json::from_value(value).map_err(|e| AppError::MalformedResponse(format!("{what}: {e}")))
}
