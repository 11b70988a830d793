//! Error handling: maps `SukuverkkoError` to Axum HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sukuverkko_core::SukuverkkoError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

pub struct ApiError(pub SukuverkkoError);

impl From<SukuverkkoError> for ApiError {
    fn from(err: SukuverkkoError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self.0 {
            SukuverkkoError::FamilyNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            SukuverkkoError::ExtractorNotConfigured => (StatusCode::SERVICE_UNAVAILABLE, "extractor_not_configured"),
            SukuverkkoError::SourceUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            SukuverkkoError::CachePersistenceWarning(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            SukuverkkoError::ExtractionFailed(_) => (StatusCode::BAD_GATEWAY, "extraction_failed"),
            SukuverkkoError::SchemaInvalid(_) => (StatusCode::BAD_GATEWAY, "schema_invalid"),
        };

        let body = ErrorBody {
            error: error_type.to_string(),
            message: self.0.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
