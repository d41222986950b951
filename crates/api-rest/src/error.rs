//! API errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_api_shared::ErrorRes;
use clinic_core::{ClinicError, RejectionReason};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request rejected: {0}")]
    Rejected(RejectionReason),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "InvalidInput", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NotFound", detail.clone()),
            ApiError::Rejected(reason) => (
                StatusCode::CONFLICT,
                reason.as_str(),
                match reason {
                    RejectionReason::SlotTaken => "slot is already requested or confirmed",
                    RejectionReason::DuplicateUserDate => {
                        "user already holds an appointment on this date"
                    }
                }
                .to_string(),
            ),
            ApiError::Unavailable(detail) => {
                tracing::warn!(detail, "document store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "StoreUnavailable",
                    "document store unavailable, retry later".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal",
                    "an internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorRes {
            code: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        match err {
            ClinicError::InvalidInput(detail) => ApiError::BadRequest(detail),
            err @ ClinicError::StoreUnavailable(_) => ApiError::Unavailable(err.to_string()),
            err @ ClinicError::StoreCorrupt(_) => ApiError::Internal(err.to_string()),
            err => ApiError::Internal(err.to_string()),
        }
    }
}
