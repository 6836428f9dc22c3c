use thiserror::Error;

/// Application-wide error types for metrotable.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A pipeline stage or request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The MediaWiki API answered with an error envelope.
    #[error("Upstream API error ({code}): {info}")]
    UpstreamApi { code: String, info: String },

    /// The upstream answer did not have the expected shape.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The search did not return the configured page as its first hit.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// The page has no section with the configured anchor.
    #[error("Section '{anchor}' not found on page '{page}'")]
    SectionNotFound { page: String, anchor: String },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true for the "page or section does not exist" outcomes.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::PageNotFound(_) | AppError::SectionNotFound { .. }
        )
    }

    /// Returns true if the failure originated upstream (transport or API).
    pub fn is_upstream(&self) -> bool {
        match self {
            AppError::HttpError(_)
            | AppError::NetworkError(_)
            | AppError::Timeout(_)
            | AppError::UpstreamApi { .. }
            | AppError::MalformedResponse(_) => true,
            AppError::PageNotFound(_)
            | AppError::SectionNotFound { .. }
            | AppError::SerializationError(_)
            | AppError::ConfigError(_) => false,
        }
    }
}
