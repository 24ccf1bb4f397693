//! API error types with HTTP response mapping.

use app::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Use-case error, mapped by variant.
    App(AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::App(err) => app_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn app_error_to_response(err: AppError) -> (StatusCode, String) {
    match &err {
        AppError::SessionNotFound(_) | AppError::DeviceNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        AppError::DeviceInactive(_) => (StatusCode::CONFLICT, err.to_string()),
        AppError::Domain(domain_err) => match domain_err {
            DomainError::SessionNotActive { .. }
            | DomainError::SessionExpired
            | DomainError::SessionAlreadyCompleted => (StatusCode::CONFLICT, err.to_string()),
            DomainError::NoItemsDetected
            | DomainError::InvalidWeight { .. }
            | DomainError::NegativeAmount { .. }
            | DomainError::InvalidCurrency { .. }
            | DomainError::CurrencyMismatch { .. }
            | DomainError::InvalidConfidenceThreshold { .. }
            | DomainError::InvalidWeightTolerance { .. }
            | DomainError::DeviceIdRequired => (StatusCode::BAD_REQUEST, err.to_string()),
        },
        AppError::Repository(_) | AppError::Resolver(_) => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}
