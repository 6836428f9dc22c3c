use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use metrotable_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        let err = &self.0;
        if err.is_not_found() {
            (StatusCode::NOT_FOUND, "not_found")
        } else if matches!(err, AppError::Timeout(_)) {
            (StatusCode::GATEWAY_TIMEOUT, "timeout")
        } else if err.is_upstream() {
            (StatusCode::BAD_GATEWAY, "upstream_error")
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(%status, "Pipeline failed: {}", self.0);
        } else {
            tracing::info!(%status, "Pipeline ended without data: {}", self.0);
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.0.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        ApiError(err).status_and_kind().0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AppError::PageNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::SectionNotFound {
                page: "x".into(),
                anchor: "List".into(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(AppError::NetworkError("reset".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(AppError::MalformedResponse("shape".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_of(AppError::Timeout(30)), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status_of(AppError::ConfigError("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::UpstreamApi {
                code: "missingtitle".into(),
                info: "gone".into(),
            }),
            StatusCode::BAD_GATEWAY
        );
        let serde_err = serde_json::from_str::<u32>("x").unwrap_err();
        assert_eq!(
            ApiError(serde_err.into()).status_and_kind(),
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        );
    }
}
