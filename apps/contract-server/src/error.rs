//! Error types for the contract server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use doc_extract::ExtractionError;
use risk_engine::AnalysisError;
use serde::Serialize;
use shared_types::audit::AuditError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::UnsupportedFormat(tag) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                format!("Unsupported format '{}'. Use PDF, DOCX, DOC or TXT", tag),
            ),
            ServerError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_DOCUMENT",
                msg.clone(),
            ),
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ServerError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for ServerError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(tag) => ServerError::UnsupportedFormat(tag),
            other @ (ExtractionError::CorruptInput { .. } | ExtractionError::EmptyResult(_)) => {
                ServerError::Unprocessable(other.to_string())
            }
        }
    }
}

impl From<AnalysisError> for ServerError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Extraction(e) => e.into(),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<AuditError> for ServerError {
    fn from(err: AuditError) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::DocumentFormat;

    #[test]
    fn test_extraction_errors_map_to_status() {
        let unsupported: ServerError = ExtractionError::UnsupportedFormat("xlsx".into()).into();
        assert_eq!(
            unsupported.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );

        let corrupt: ServerError = ExtractionError::CorruptInput {
            format: DocumentFormat::Pdf,
            reason: "bad xref".into(),
        }
        .into();
        assert_eq!(
            corrupt.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let empty: ServerError = ExtractionError::EmptyResult(DocumentFormat::Txt).into();
        assert_eq!(empty.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_analysis_errors_map_to_status() {
        let cancelled: ServerError = AnalysisError::Cancelled.into();
        assert_eq!(
            cancelled.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let wrapped: ServerError =
            AnalysisError::Extraction(ExtractionError::UnsupportedFormat("rtf".into())).into();
        assert!(matches!(wrapped, ServerError::UnsupportedFormat(ref t) if t == "rtf"));
    }
}
