use axum::http::StatusCode;

use metrotable_core::AppError;
use metrotable_core::testutil::{
    MockFetcher, TEST_PAGE_TITLE, content_body, search_body, sections_body,
};

use crate::common::{TEST_ANCHOR, get, setup_test_app};

const FALLBACK_URL: &str = "https://en.wikipedia.org/List_of_metropolitan_areas_in_Asia";

const METRO_TABLE: &str = r#"<div class="mw-parser-output">
<h2 id="List">List</h2>
<table class="wikitable sortable">
<tbody>
<tr><th>Metropolitan area</th><th>Country</th><th>Population</th></tr>
<tr><td>Tokyo</td><td>Japan</td><td>37,400,000</td></tr>
<tr><td>Delhi</td><td>India</td><td>30,290,936</td></tr>
</tbody>
</table>
</div>"#;

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app(MockFetcher::with_responses(vec![]));
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn extracts_metro_table() {
    let fetcher = MockFetcher::for_pipeline(TEST_ANCHOR, "2", METRO_TABLE);
    let app = setup_test_app(fetcher.clone());

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"name": "Tokyo", "country": "Japan", "population": 37400000, "url": FALLBACK_URL},
            {"name": "Delhi", "country": "India", "population": 30290936, "url": FALLBACK_URL},
        ])
    );

    let requested = fetcher.requested();
    assert_eq!(requested.len(), 3);
    assert!(requested[2].contains("section=2"));
}

#[tokio::test]
async fn body_is_tab_indented() {
    let app = setup_test_app(MockFetcher::for_pipeline(TEST_ANCHOR, "2", METRO_TABLE));
    let (_, body) = get(app, "/").await;
    assert!(body.starts_with("[\n\t{\n\t\t\"name\": \"Tokyo\""));
}

#[tokio::test]
async fn empty_table_returns_sentinel() {
    let html = "<table><tr><th>City</th><th>Country</th><th>Population</th></tr></table>";
    let app = setup_test_app(MockFetcher::for_pipeline(TEST_ANCHOR, "2", html));

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!([{"error": "no data"}]));
}

#[tokio::test]
async fn page_not_first_hit_returns_404() {
    let fetcher = MockFetcher::new(&search_body(&["List of cities in Asia", TEST_PAGE_TITLE]));
    let (status, body) = get(setup_test_app(fetcher), "/").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "not_found");
    assert!(json["message"].as_str().unwrap().contains(TEST_PAGE_TITLE));
}

#[tokio::test]
async fn empty_search_returns_404() {
    let (status, _) = get(setup_test_app(MockFetcher::new(&search_body(&[]))), "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_section_returns_404() {
    let fetcher = MockFetcher::with_responses(vec![
        Ok(search_body(&[TEST_PAGE_TITLE])),
        Ok(sections_body(&[("Overview", "1"), ("References", "2")])),
    ]);
    let (status, body) = get(setup_test_app(fetcher), "/").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["message"].as_str().unwrap().contains("'List'"));
}

#[tokio::test]
async fn transport_failure_returns_502() {
    let fetcher = MockFetcher::with_error(AppError::NetworkError("Connection failed".into()));
    let (status, body) = get(setup_test_app(fetcher), "/").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "upstream_error");
}

#[tokio::test]
async fn malformed_content_returns_502() {
    let fetcher = MockFetcher::with_responses(vec![
        Ok(search_body(&[TEST_PAGE_TITLE])),
        Ok(sections_body(&[(TEST_ANCHOR, "2")])),
        Ok(r#"{"parse": {"title": "no text here"}}"#.to_string()),
    ]);
    let (status, _) = get(setup_test_app(fetcher), "/").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn upstream_timeout_returns_504() {
    let fetcher = MockFetcher::with_error(AppError::Timeout(30));
    let (status, body) = get(setup_test_app(fetcher), "/").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "timeout");
}

#[tokio::test]
async fn each_request_runs_a_fresh_pipeline() {
    let fetcher = MockFetcher::with_responses(vec![
        Ok(search_body(&[TEST_PAGE_TITLE])),
        Ok(sections_body(&[(TEST_ANCHOR, "2")])),
        Ok(content_body(METRO_TABLE)),
        Ok(search_body(&[TEST_PAGE_TITLE])),
        Ok(sections_body(&[(TEST_ANCHOR, "2")])),
        Ok(content_body(METRO_TABLE)),
    ]);
    let app = setup_test_app(fetcher.clone());

    let (first, _) = get(app.clone(), "/").await;
    let (second, _) = get(app, "/").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(fetcher.requested().len(), 6);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = get(setup_test_app(MockFetcher::with_responses(vec![])), "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["paths"]["/"].is_object());
}
