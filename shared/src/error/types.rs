//! `AppError` and the JSON error body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every handler
///
/// `details` carries structured context, e.g. `fields` for per-field
/// validation messages or `product_id` for a stock shortfall.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Write lock contention, maps to 503
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::SystemBusy, msg)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Missing or malformed Authorization header
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Append `msg` to `details.fields.<field>`
    pub fn with_field_error(mut self, field: impl Into<String>, msg: impl Into<String>) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        let fields = details
            .entry("fields".to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Value::Object(map) = fields
            && let Some(messages) = map
                .entry(field.into())
                .or_insert_with(|| Value::Array(Vec::new()))
                .as_array_mut()
        {
            messages.push(Value::String(msg.into()));
        }
        self
    }

    /// Validation failure on one field
    pub fn field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self::validation(msg.clone()).with_field_error(field, msg)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Body of every non-2xx response: `{ code, message, details? }`
///
/// Successful responses are the bare payload, never wrapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();

        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }

        (status, axum::Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_new_uses_default_message() {
        let err = AppError::new(ErrorCode::CartEmpty);
        assert_eq!(err.message, "Cart is empty");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn test_with_detail() {
        let err = AppError::with_message(ErrorCode::ProductOutOfStock, "Only 2 left")
            .with_detail("product_id", 7)
            .with_detail("available", 2);

        let details = err.details.unwrap();
        assert_eq!(details["product_id"], 7);
        assert_eq!(details["available"], 2);
    }

    #[test]
    fn test_field_errors_accumulate() {
        let err = AppError::field("contact_phone", "contact_phone is required")
            .with_field_error("delivery_address", "delivery_address is required")
            .with_field_error("delivery_address", "delivery_address is too long");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        let fields = &details["fields"];
        assert_eq!(fields["contact_phone"][0], "contact_phone is required");
        assert_eq!(fields["delivery_address"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_auth_constructors() {
        assert_eq!(AppError::unauthorized().code, ErrorCode::NotAuthenticated);
        assert_eq!(AppError::token_expired().code, ErrorCode::TokenExpired);
        let err = AppError::invalid_token("Unknown user");
        assert_eq!(err.code, ErrorCode::TokenInvalid);
        assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_error_body_json() {
        let err = AppError::new(ErrorCode::OrderNotPending);
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": 4010, "message": "Only pending orders can be cancelled" })
        );

        let body: ErrorBody =
            serde_json::from_str(r#"{"code":6003,"message":"x","details":{"product_id":1}}"#).unwrap();
        assert_eq!(body.code, 6003);
        assert_eq!(body.details.unwrap()["product_id"], 1);
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::busy("database is locked").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = AppError::field("rating", "rating must be 1-5").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
