//! API error handling
//!
//! Every failure leaves the server as `{error, code, details?}` JSON.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::RateLimited => "rate_limited",
            Self::BadGateway(_) => "upstream_error",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();
        let (message, details) = match self {
            Self::BadRequest(msg) => ("Bad request".to_string(), Some(msg)),
            Self::NotFound(msg) => ("Not found".to_string(), Some(msg)),
            Self::RateLimited => ("Rate limit exceeded".to_string(), None),
            Self::BadGateway(msg) => ("Upstream service unavailable".to_string(), Some(msg)),
            Self::Configuration(msg) => ("Server misconfigured".to_string(), Some(msg)),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("An internal error occurred".to_string(), Some(msg))
            },
        };

        let body = ErrorResponse {
            error: message,
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::RateLimited => Self::RateLimited,
            ApplicationError::ExternalService(msg) => Self::BadGateway(msg),
            ApplicationError::NotFound(msg) => Self::NotFound(msg),
            ApplicationError::Configuration(msg) => Self::Configuration(msg),
            ApplicationError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<domain::DomainError> for ApiError {
    fn from(err: domain::DomainError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_bad_request_message() {
        let err = ApiError::BadRequest("invalid language".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid language");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn configuration_maps_to_500() {
        let err: ApiError =
            ApplicationError::Configuration("kmb.stop_list_url is not configured".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "configuration_error");
    }

    #[test]
    fn external_service_maps_to_502() {
        let err: ApiError = ApplicationError::ExternalService("HKO: timeout".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err: ApiError = ApplicationError::NotFound("route 999X".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn domain_error_maps_to_400() {
        let err: ApiError = domain::DomainError::UnsupportedLanguage("de".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_response_serialization() {
        let resp = ErrorResponse {
            error: "Bad request".to_string(),
            code: "bad_request".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("code"));
        assert!(!json.contains("details"));
    }

    #[tokio::test]
    async fn into_response_sets_status() {
        let response = ApiError::BadGateway("KMB: HTTP 503".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
