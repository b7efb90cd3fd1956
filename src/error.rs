// HTTP API Error Types
use axum::{extract::rejection::BytesRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::types::BindError;

/// Shown when the request carries nothing to save
pub const NO_DATA_MESSAGE: &str = "저장할 데이터가 없습니다.";

/// Prefix of every internal failure message
pub const SAVE_FAILED_PREFIX: &str = "저장 중 오류가 발생했습니다: ";

/// HTTP API error with status code and client-facing message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError(String),

    // 500 Internal Server Error
    InvalidJson(String),
    SchemaError(String),
    PersistenceError(String),
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_)
            | ApiError::SchemaError(_)
            | ApiError::PersistenceError(_)
            | ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Underlying reason, without any prefix
    pub fn detail(&self) -> &str {
        match self {
            ApiError::ValidationError(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::SchemaError(msg)
            | ApiError::PersistenceError(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Client-facing message. Validation failures are shown verbatim,
    /// everything else behind the save-failed prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::ValidationError(msg) | ApiError::ServiceUnavailable(msg) => msg.clone(),
            _ => format!("{}{}", SAVE_FAILED_PREFIX, self.detail()),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "message": self.message()
        })
    }

    /// Stable code used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::SchemaError(_) => "SCHEMA_ERROR",
            ApiError::PersistenceError(_) => "PERSISTENCE_ERROR",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn no_data() -> Self {
        ApiError::ValidationError(NO_DATA_MESSAGE.to_string())
    }

    pub fn schema(err: DatabaseError) -> Self {
        ApiError::SchemaError(err.to_string())
    }

    pub fn persistence(err: DatabaseError) -> Self {
        ApiError::PersistenceError(err.to_string())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidJson(err.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::InternalServerError(rejection.body_text())
    }
}

impl From<BindError> for ApiError {
    fn from(err: BindError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "request failed: {}", self.detail());
        }
        (status, Json(self.to_json())).into_response()
    }
}
