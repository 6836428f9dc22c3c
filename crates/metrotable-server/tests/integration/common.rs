use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use metrotable_client::HtmlTableParser;
use metrotable_core::PipelineConfig;
use metrotable_core::pipeline::TablePipeline;
use metrotable_core::testutil::{MockFetcher, TEST_PAGE_URL};
use metrotable_server::routes;
use metrotable_server::state::AppState;

pub const TEST_ANCHOR: &str = "List";

/// Router backed by the real parser and a scripted upstream.
pub fn setup_test_app(fetcher: MockFetcher) -> Router {
    let config = PipelineConfig::new(TEST_PAGE_URL, TEST_ANCHOR, 5).expect("valid test config");
    let pipeline = TablePipeline::new(fetcher, HtmlTableParser::new(), config);
    routes::router(Arc::new(AppState::from_pipeline(pipeline)))
}

/// Send `GET uri` and return status plus raw body text.
pub async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}
