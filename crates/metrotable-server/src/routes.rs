use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use utoipa::OpenApi;

use metrotable_core::models::to_tab_indented_json;

use crate::dto::{AreaRow, ErrorResponse, HealthResponse, area_rows};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub const NO_CONTENT_MESSAGE: &str = "The server cannot return any content.";

/// Build the full router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_areas))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Areas
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Extracted table rows, or a single no-data row", body = [AreaRow]),
        (status = 204, description = "Result could not be serialized"),
        (status = 404, description = "Page or section not found", body = ErrorResponse),
        (status = 502, description = "Upstream API failure", body = ErrorResponse),
        (status = 504, description = "Upstream API timed out", body = ErrorResponse),
    ),
    tag = "areas"
)]
pub async fn list_areas(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let result = (state.run_pipeline)().await?;
    tracing::info!(
        rows = result.len(),
        sentinel = result.is_sentinel(),
        "Pipeline completed"
    );

    Ok(pretty_json_response(&area_rows(&result)))
}

/// Tab-indented JSON with status 200, or 204 with a plain-text note when
/// the value cannot be serialized.
pub fn pretty_json_response<T: Serialize + ?Sized>(value: &T) -> Response {
    match to_tab_indented_json(value) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Response serialization failed: {e}");
            (StatusCode::NO_CONTENT, NO_CONTENT_MESSAGE).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse { status: "healthy" })
}

pub async fn openapi_json() -> impl IntoResponse {
    axum::Json(ApiDoc::openapi())
}
