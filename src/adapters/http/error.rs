//! Error responses for the governance API.
//!
//! Every area error carries an [`ErrorCode`]; the HTTP status follows from
//! its [`ErrorKind`]:
//!
//! | Kind | HTTP Status |
//! |------|-------------|
//! | NotFound | 404 |
//! | InvalidState / Conflict | 409 |
//! | CapacityExceeded | 422 |
//! | Validation | 400 |
//! | Infrastructure | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::CronError;
use crate::domain::commission::CommissionError;
use crate::domain::enrollment::EnrollmentError;
use crate::domain::foundation::{DomainError, ErrorCode, ErrorKind, ValidationError};
use crate::domain::live_class::LiveClassError;
use crate::domain::subscription::SubscriptionError;

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts area errors to HTTP responses.
#[derive(Debug, Clone)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.code.kind())
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::CapacityExceeded => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

macro_rules! from_area_error {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for ApiError {
                fn from(err: $err) -> Self {
                    Self::new(err.code(), err.to_string())
                }
            }
        )*
    };
}

from_area_error!(SubscriptionError, CommissionError, LiveClassError, EnrollmentError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::new(err.code, err.message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<CronError> for ApiError {
    fn from(err: CronError) -> Self {
        match err {
            CronError::Commissions(e) => e.into(),
            CronError::Subscriptions(e) => e.into(),
            CronError::Domain(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(code = %self.code, error = %self.message, "Request failed");
            "Internal server error".to_string()
        } else {
            self.message
        };
        let body = ErrorResponse::new(self.code.to_string(), message);
        (status, Json(body)).into_response()
    }
}
