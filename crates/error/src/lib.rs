pub mod middleware_handling;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(anyhow::Error),
    DatabaseError(anyhow::Error),
    ServerError(anyhow::Error),
    ValidationError(Vec<String>),
    PayloadTooLargeError(String),
    NotFoundError(String),
    AuthenticationError(String),
    AuthorizationError(String),
    ConflictError(String),
}

impl AppError {
    // Unknown email and wrong password deliberately share this message
    pub fn invalid_credentials() -> Self {
        Self::AuthenticationError("Invalid email or password".to_string())
    }

    pub fn token_expired() -> Self {
        Self::AuthenticationError(
            "Your session has expired. Please log in again to continue.".to_string(),
        )
    }

    pub fn token_invalid() -> Self {
        Self::AuthenticationError("Invalid or missing authentication token".to_string())
    }

    // Resource errors
    pub fn resource_not_found(resource_type: &str, identifier: &str) -> Self {
        Self::NotFoundError(format!(
            "{} with identifier '{}' was not found.",
            resource_type, identifier
        ))
    }

    pub fn resource_exists(resource_type: &str, field: &str) -> Self {
        Self::ConflictError(format!(
            "A {} with this {} already exists",
            resource_type, field
        ))
    }

    // Validation errors
    pub fn validation(field: &str, message: &str) -> Self {
        Self::ValidationError(vec![format!("Validation failed for '{}': {}", field, message)])
    }
}

impl std::error::Error for AppError {}

// Convert from various error types to AppError
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::ServerError(error)
    }
}

// Human-friendly error messages
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(e) => write!(f, "Configuration error: {}", e),
            Self::DatabaseError(e) => write!(f, "Database error: {}", e),
            Self::ServerError(e) => write!(f, "Server error: {}", e),
            Self::ValidationError(msgs) => write!(f, "Validation error: {}", msgs.join(", ")),
            Self::PayloadTooLargeError(msg) => write!(f, "Payload too large: {}", msg),
            Self::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Self::AuthenticationError(msg) => write!(f, "Authentication error: {}", msg),
            Self::AuthorizationError(msg) => write!(f, "Authorization error: {}", msg),
            Self::ConflictError(msg) => write!(f, "Conflict error: {}", msg),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code, help_text) = match &self {
            Self::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "System configuration error".to_string(),
                "CONFIG_ERROR",
                None,
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database operation failed".to_string(),
                "DB_ERROR",
                None,
            ),
            Self::ValidationError(_) => (
                StatusCode::BAD_REQUEST,
                "Validation error".to_string(),
                "VALIDATION_ERROR",
                Some("Please review your input and try again."),
            ),
            Self::PayloadTooLargeError(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "The request body exceeds the maximum allowed size".to_string(),
                "PAYLOAD_TOO_LARGE",
                Some("Please reduce the size of your request and try again."),
            ),
            Self::NotFoundError(msg) => (
                StatusCode::NOT_FOUND,
                msg.clone(),
                "NOT_FOUND",
                Some("The requested resource was not found."),
            ),
            Self::AuthenticationError(msg) => (
                StatusCode::UNAUTHORIZED,
                msg.clone(),
                "AUTH_ERROR",
                Some("Please log in to access this resource."),
            ),
            Self::AuthorizationError(msg) => (
                StatusCode::FORBIDDEN,
                msg.clone(),
                "FORBIDDEN",
                Some("You don't have permission to access this resource."),
            ),
            Self::ConflictError(msg) => (
                StatusCode::CONFLICT,
                msg.clone(),
                "CONFLICT",
                Some("A resource with these details already exists."),
            ),
            Self::ServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "SERVER_ERROR",
                None,
            ),
        };

        // Log the full error server-side; the client only sees the normalized message
        let log_message = format!("[{}] {}: {}", error_code, status, self);
        if status.is_server_error() {
            tracing::error!(error_code = error_code, status_code = %status.as_u16(), %error_message, "{}", log_message);
        } else {
            tracing::warn!(error_code = error_code, status_code = %status.as_u16(), %error_message, "{}", log_message);
        }

        let errors = match &self {
            Self::ValidationError(msgs) => Some(msgs.clone()),
            _ => None,
        };

        let body = Json(ErrorResponse {
            status: status.to_string(),
            message: error_message,
            code: error_code.to_string(),
            errors,
            details: if status == StatusCode::INTERNAL_SERVER_ERROR {
                None // Don't expose internal error details to clients
            } else {
                Some(self.to_string())
            },
            help: help_text.map(String::from),
        });

        (status, body).into_response()
    }
}

// Utility for anyhow results to AppError conversions
pub type AppResult<T> = Result<T, AppError>;

// Extension trait to wrap anyhow errors with specific context
pub trait AppErrorExt<T> {
    fn config_err(self) -> AppResult<T>;
    fn db_err(self) -> AppResult<T>;
    fn server_err(self) -> AppResult<T>;
}

impl<T, E> AppErrorExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn config_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ConfigError(e.into()))
    }

    fn db_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::DatabaseError(e.into()))
    }

    fn server_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ServerError(e.into()))
    }
}
