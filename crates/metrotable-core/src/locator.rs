use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::AppError;

/// Path of the MediaWiki action API relative to the wiki's domain.
pub const API_PATH: &str = "/w/api.php";

/// Which URL form to derive from a canonical page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// Last path segment, percent-decoded, e.g. `List_of_metropolitan_areas_in_Asia`.
    Title,
    /// `protocol//domain/w/api.php`
    ApiBase,
    /// `protocol//domain`
    WikiBase,
}

/// Derive one URL form from a canonical page URL.
///
/// Splits on the `//` protocol separator. Pure string work, no network access.
/// Example: `("https://en.wikipedia.org/wiki/Tokyo", WikiBase)` → `"https://en.wikipedia.org"`
pub fn derive_url(kind: UrlKind, source_url: &str) -> String {
    let (protocol, rest) = source_url.split_once("//").unwrap_or(("", source_url));
    let domain = rest.split('/').next().unwrap_or_default();

    match kind {
        UrlKind::Title => {
            let segment = rest.rsplit('/').next().unwrap_or_default();
            percent_decode_str(segment).decode_utf8_lossy().into_owned()
        }
        UrlKind::ApiBase => format!("{protocol}//{domain}{API_PATH}"),
        UrlKind::WikiBase => format!("{protocol}//{domain}"),
    }
}

/// Identity of the target article.
///
/// Only the canonical URL is stored; title and base URLs are recomputed
/// from it on every access so they can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIdentity {
    source_url: String,
}

impl PageIdentity {
    pub fn new(source_url: impl Into<String>) -> Result<Self, AppError> {
        let source_url = source_url.into();

        let Some((protocol, rest)) = source_url.split_once("//") else {
            return Err(AppError::ConfigError(format!(
                "Page URL '{source_url}' has no protocol separator"
            )));
        };
        if protocol.is_empty() || rest.split('/').next().unwrap_or_default().is_empty() {
            return Err(AppError::ConfigError(format!(
                "Page URL '{source_url}' has no protocol or domain"
            )));
        }
        if derive_url(UrlKind::Title, &source_url).is_empty() || !rest.contains('/') {
            return Err(AppError::ConfigError(format!(
                "Page URL '{source_url}' has no page title"
            )));
        }

        // The derived API base must itself be a usable URL.
        Url::parse(&derive_url(UrlKind::ApiBase, &source_url))
            .map_err(|e| AppError::ConfigError(format!("Invalid page URL '{source_url}': {e}")))?;

        Ok(Self { source_url })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn title(&self) -> String {
        derive_url(UrlKind::Title, &self.source_url)
    }

    /// Title as the search API reports it: underscores become spaces.
    pub fn normalized_title(&self) -> String {
        self.title().replace('_', " ")
    }

    pub fn api_base(&self) -> String {
        derive_url(UrlKind::ApiBase, &self.source_url)
    }

    pub fn wiki_base(&self) -> String {
        derive_url(UrlKind::WikiBase, &self.source_url)
    }

    /// Reference URL used for rows whose name cell carries no link.
    pub fn fallback_url(&self) -> String {
        format!("{}/{}", self.wiki_base(), self.title())
    }

    /// `action=query&list=search` for the normalized title.
    pub fn search_url(&self) -> Result<String, AppError> {
        self.api_url(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", &self.normalized_title()),
            ("format", "json"),
        ])
    }

    /// `action=parse&prop=sections` for the page.
    pub fn sections_url(&self) -> Result<String, AppError> {
        self.api_url(&[
            ("action", "parse"),
            ("page", &self.title()),
            ("prop", "sections"),
            ("format", "json"),
        ])
    }

    /// `action=parse&section=N` returning the rendered section markup.
    pub fn section_content_url(&self, index: u32) -> Result<String, AppError> {
        self.api_url(&[
            ("action", "parse"),
            ("page", &self.title()),
            ("section", &index.to_string()),
            ("prop", "text"),
            ("format", "json"),
        ])
    }

    fn api_url(&self, params: &[(&str, &str)]) -> Result<String, AppError> {
        let mut url = Url::parse(&self.api_base())
            .map_err(|e| AppError::ConfigError(format!("Invalid API base URL: {e}")))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "http://en.wikipedia.org/wiki/List_of_metropolitan_areas_in_Asia";

    #[test]
    fn test_derive_url_kinds() {
        assert_eq!(
            derive_url(UrlKind::Title, SOURCE),
            "List_of_metropolitan_areas_in_Asia"
        );
        assert_eq!(
            derive_url(UrlKind::ApiBase, SOURCE),
            "http://en.wikipedia.org/w/api.php"
        );
        assert_eq!(derive_url(UrlKind::WikiBase, SOURCE), "http://en.wikipedia.org");
    }

    #[test]
    fn test_derive_url_is_pure() {
        assert_eq!(
            derive_url(UrlKind::ApiBase, SOURCE),
            derive_url(UrlKind::ApiBase, SOURCE)
        );
    }

    #[test]
    fn test_identity_derivations() {
        let identity = PageIdentity::new(SOURCE).unwrap();
        assert_eq!(identity.title(), "List_of_metropolitan_areas_in_Asia");
        assert_eq!(
            identity.normalized_title(),
            "List of metropolitan areas in Asia"
        );
        assert_eq!(
            identity.fallback_url(),
            "http://en.wikipedia.org/List_of_metropolitan_areas_in_Asia"
        );
    }

    #[test]
    fn test_percent_encoded_title_is_decoded_once() {
        let identity =
            PageIdentity::new("https://en.wikipedia.org/wiki/List_of_cities_in_S%C3%A3o_Paulo")
                .unwrap();
        assert_eq!(identity.title(), "List_of_cities_in_São_Paulo");
        assert_eq!(identity.normalized_title(), "List of cities in São Paulo");
        assert_eq!(
            identity.sections_url().unwrap(),
            "https://en.wikipedia.org/w/api.php?action=parse&page=List_of_cities_in_S%C3%A3o_Paulo&prop=sections&format=json"
        );
        assert!(
            identity
                .search_url()
                .unwrap()
                .contains("srsearch=List+of+cities+in+S%C3%A3o+Paulo")
        );
    }

    #[test]
    fn test_identity_rejects_bad_urls() {
        assert!(PageIdentity::new("en.wikipedia.org/wiki/Tokyo").is_err());
        assert!(PageIdentity::new("https://en.wikipedia.org/wiki/").is_err());
        assert!(PageIdentity::new("https://en.wikipedia.org").is_err());
        assert!(PageIdentity::new("https:///wiki/Tokyo").is_err());
    }

    #[test]
    fn test_search_url_encodes_normalized_title() {
        let identity = PageIdentity::new(SOURCE).unwrap();
        let url = identity.search_url().unwrap();
        assert!(url.starts_with("http://en.wikipedia.org/w/api.php?action=query&list=search"));
        assert!(url.contains("srsearch=List+of+metropolitan+areas+in+Asia"));
        assert!(url.ends_with("format=json"));
    }

    #[test]
    fn test_section_urls() {
        let identity = PageIdentity::new(SOURCE).unwrap();
        assert_eq!(
            identity.sections_url().unwrap(),
            "http://en.wikipedia.org/w/api.php?action=parse&page=List_of_metropolitan_areas_in_Asia&prop=sections&format=json"
        );
        assert_eq!(
            identity.section_content_url(2).unwrap(),
            "http://en.wikipedia.org/w/api.php?action=parse&page=List_of_metropolitan_areas_in_Asia&section=2&prop=text&format=json"
        );
    }
}
