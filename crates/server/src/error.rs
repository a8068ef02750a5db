//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use faqchat_core::AppError;
use serde_json::json;

/// An application error paired with the HTTP status it maps to.
///
/// The body shape is `{error, details, type}`: a short label, the full
/// message, and the stable classification tag.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: String,
    kind: &'static str,
}

impl ApiError {
    /// A 400 for requests the handler rejects before touching the engine.
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Query is required".to_string(),
            details: details.into(),
            kind: "InvalidQuery",
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match err {
            AppError::InvalidQuery => StatusCode::BAD_REQUEST,
            AppError::UnknownThread(_) => StatusCode::NOT_FOUND,
            // Configuration and provider failures are server-side
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            error: "Failed to process query".to_string(),
            details: err.to_string(),
            kind: err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({
            "error": self.error,
            "details": self.details,
            "type": self.kind,
        }));

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_maps_to_400() {
        let api_err = ApiError::from(AppError::InvalidQuery);
        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.kind, "InvalidQuery");
    }

    #[test]
    fn test_provider_failure_maps_to_500() {
        let api_err = ApiError::from(AppError::Completion("overloaded".to_string()));
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.kind, "CompletionFailure");
        assert!(api_err.details.contains("overloaded"));
    }

    #[test]
    fn test_config_failure_maps_to_500() {
        let api_err = ApiError::from(AppError::Config("missing key".to_string()));
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.kind, "ConfigurationError");
    }
}
