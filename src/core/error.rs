//! Typed error handling for the Depo API
//!
//! Every failure a handler can surface is an [`ApiError`]. Each variant maps
//! to an HTTP status and to the error `name` clients already know from the
//! content API (`ValidationError`, `ApplicationError`, ...), and renders the
//! same JSON envelope:
//!
//! ```json
//! {
//!   "data": null,
//!   "error": {
//!     "status": 400,
//!     "name": "ValidationError",
//!     "message": "Invalid identifier or password",
//!     "details": {}
//!   }
//! }
//! ```
//!
//! # Error Categories
//!
//! - [`ApiError`]: Errors returned by HTTP handlers
//! - [`AuthError`]: Errors raised while signing or verifying tokens
//! - [`ConfigError`]: Errors related to configuration parsing and validation

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Path to the offending field (e.g. `["identifier"]`)
    pub path: Vec<String>,
    /// Human-readable message
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.into()],
            message: message.into(),
        }
    }
}

/// The main error type returned by handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed input or rejected credentials
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldIssue>,
    },

    /// Request was well-formed but the application refuses it
    #[error("{0}")]
    Application(String),

    /// Generic bad request (refresh token flow)
    #[error("{0}")]
    BadRequest(String),

    /// Credentials were presented but are not acceptable
    #[error("{0}")]
    Unauthorized(String),

    /// No credentials were presented for a protected route
    #[error("{0}")]
    Forbidden(String),

    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body nested under the `error` key of the response envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub name: &'static str,
    pub message: String,
    pub details: Value,
}

/// Full error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub data: Option<Value>,
    pub error: ErrorBody,
}

impl ApiError {
    /// Validation error without field details
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Validation error built from field issues
    ///
    /// A single issue becomes the message; several are summarised.
    pub fn from_issues(errors: Vec<FieldIssue>) -> Self {
        let message = match errors.as_slice() {
            [single] => single.message.clone(),
            many => format!("{} errors occurred", many.len()),
        };
        ApiError::Validation { message, errors }
    }

    pub fn application(message: impl Into<String>) -> Self {
        ApiError::Application(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn storage(err: anyhow::Error) -> Self {
        ApiError::Storage(err)
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(err.to_string())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Application(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error name clients match on
    pub fn error_name(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "ValidationError",
            ApiError::Application(_) => "ApplicationError",
            ApiError::BadRequest(_) => "BadRequestError",
            ApiError::Unauthorized(_) => "UnauthorizedError",
            ApiError::Forbidden(_) => "ForbiddenError",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::Storage(_) | ApiError::Internal(_) => {
                "InternalServerError"
            }
        }
    }

    /// Re-label the error as a bad request, keeping its message
    ///
    /// Server-side failures are collapsed to a generic message so storage
    /// details never reach the client.
    pub fn into_bad_request(self) -> Self {
        match self {
            ApiError::BadRequest(_) => self,
            ApiError::Storage(_) | ApiError::Internal(_) => {
                tracing::error!(error = %self, "request failed with a server-side error");
                ApiError::BadRequest("Unable to process request".to_string())
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            // Never echo backend internals
            ApiError::Storage(_) | ApiError::Internal(_) => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        ErrorResponse {
            data: None,
            error: ErrorBody {
                status: self.status_code().as_u16(),
                name: self.error_name(),
                message,
                details: self.details(),
            },
        }
    }

    fn details(&self) -> Value {
        match self {
            ApiError::Validation { errors, .. } if !errors.is_empty() => {
                json!({ "errors": errors })
            }
            _ => json!({}),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors raised by the token layer
///
/// Absent tokens and unusable tokens are distinct variants so callers can
/// decide how much to reveal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No token was supplied
    #[error("No Authorization")]
    Missing,

    /// Token is malformed or its signature does not match
    #[error("Invalid token.")]
    Invalid,

    /// Token signature is valid but it has expired
    #[error("Token expired.")]
    Expired,

    /// Token could not be signed
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{f}'")).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required field in configuration
    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::application("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::storage(anyhow::anyhow!("disk")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_names() {
        assert_eq!(ApiError::validation("x").error_name(), "ValidationError");
        assert_eq!(ApiError::application("x").error_name(), "ApplicationError");
        assert_eq!(ApiError::bad_request("x").error_name(), "BadRequestError");
        assert_eq!(ApiError::internal("x").error_name(), "InternalServerError");
    }

    #[test]
    fn test_single_issue_becomes_message() {
        let err = ApiError::from_issues(vec![FieldIssue::new(
            "password",
            "password is a required field",
        )]);
        assert_eq!(err.to_string(), "password is a required field");

        let response = err.to_response();
        assert_eq!(response.error.details["errors"][0]["path"][0], "password");
    }

    #[test]
    fn test_many_issues_are_summarised() {
        let err = ApiError::from_issues(vec![
            FieldIssue::new("identifier", "identifier is a required field"),
            FieldIssue::new("password", "password is a required field"),
        ]);
        assert_eq!(err.to_string(), "2 errors occurred");
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err = ApiError::storage(anyhow::anyhow!("connection refused on 10.0.0.3"));
        let response = err.to_response();
        assert_eq!(response.error.message, "Internal Server Error");
        assert_eq!(response.error.status, 500);
    }

    #[test]
    fn test_into_bad_request_keeps_client_message() {
        let err = ApiError::application("Your account has been blocked by an administrator")
            .into_bad_request();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Your account has been blocked by an administrator"
        );
    }

    #[test]
    fn test_into_bad_request_hides_storage_message() {
        let err = ApiError::storage(anyhow::anyhow!("lock poisoned")).into_bad_request();
        assert_eq!(err.to_string(), "Unable to process request");
    }

    #[test]
    fn test_server_side_variants_are_internal() {
        for err in [
            ApiError::storage(anyhow::anyhow!("disk full")),
            ApiError::internal("signer unavailable"),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.error_name(), "InternalServerError");
            assert_eq!(err.to_response().error.message, "Internal Server Error");
        }
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiError::application("This provider is disabled").to_response())
            .unwrap();
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["status"], 400);
        assert_eq!(body["error"]["name"], "ApplicationError");
        assert_eq!(body["error"]["message"], "This provider is disabled");
        assert!(body["error"]["details"].is_object());
    }

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(AuthError::Missing.to_string(), "No Authorization");
        assert_eq!(AuthError::Invalid.to_string(), "Invalid token.");
        assert_eq!(AuthError::Expired.to_string(), "Token expired.");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ParseError {
            file: Some("depo.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse config file 'depo.yaml': bad indent"
        );

        let err = ConfigError::ParseError {
            file: None,
            message: "bad indent".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse config: bad indent");
    }
}
