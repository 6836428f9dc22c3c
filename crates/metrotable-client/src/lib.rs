pub mod fetcher;
pub mod table;

pub use fetcher::ReqwestFetcher;
pub use table::{ColumnMap, HtmlTableParser};
