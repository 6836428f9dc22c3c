pub mod config;
pub mod error;
pub mod locator;
pub mod models;
pub mod pipeline;
pub mod traits;
pub mod wiki;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::PipelineConfig;
pub use error::AppError;
pub use locator::{PageIdentity, UrlKind, derive_url};
pub use models::{Population, ResultSet, SectionReference, TableRecord};
pub use pipeline::TablePipeline;
pub use traits::{Fetcher, TableParser};
