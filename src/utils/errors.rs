//! Error handling
//!
//! This module defines every error the API can return and how each one
//! is mapped to an HTTP response. All error bodies share the shape
//! `{ success: false, message, errors? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

/// Main application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0} already exists")]
    UniqueViolation(String),

    #[error("Upload rejected: {0}")]
    UploadConstraint(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let field = db
                    .constraint()
                    .map(constraint_field)
                    .unwrap_or("field")
                    .to_string();
                AppError::UniqueViolation(field)
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                not_found_error(db.constraint().map(referenced_resource).unwrap_or("Record"))
            }
            _ => AppError::Database(e),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e)
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

/// `users_email_key` -> `email`
fn constraint_field(constraint: &str) -> &str {
    let trimmed = constraint.strip_suffix("_key").unwrap_or(constraint);
    trimmed.rsplit('_').next().unwrap_or(trimmed)
}

/// `inquiries_vehicle_id_fkey` -> `Vehicle`
fn referenced_resource(constraint: &str) -> &'static str {
    let column = constraint.strip_suffix("_fkey").unwrap_or(constraint);
    if column.ends_with("vehicle_id") {
        "Vehicle"
    } else {
        "Record"
    }
}

/// One field-level problem reported back to the client
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error body returned by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::UniqueViolation(_)
            | AppError::UploadConstraint(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::TokenExpired
            | AppError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Hash(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Field-level detail, sorted by field name so responses are stable.
    pub fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            AppError::Validation(errors) => Some(flatten_validation_errors(errors)),
            _ => None,
        }
    }
}

pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut flat: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, list)| {
            list.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", field, error.code)),
            })
        })
        .collect();
    flat.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
    flat
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let errors = self.field_errors();

        let message = match &self {
            AppError::Validation(_) => "Validation Error".to_string(),
            AppError::BadRequest(msg)
            | AppError::UploadConstraint(msg)
            | AppError::NotAuthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::UniqueViolation(_)
            | AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::TokenExpired => self.to_string(),
            AppError::Database(e) => {
                tracing::error!("❌ Database error: {}", e);
                "Server Error".to_string()
            }
            AppError::Storage(e) => {
                tracing::error!("❌ Storage error: {}", e);
                "Server Error".to_string()
            }
            AppError::Hash(msg) => {
                tracing::error!("❌ Hash error: {}", msg);
                "Server Error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                "Server Error".to_string()
            }
        };

        if status.is_client_error() {
            tracing::debug!("{} -> {}", status, message);
        }

        let body = ErrorResponse {
            success: false,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Typed result for fallible operations
pub type AppResult<T> = Result<T, AppError>;

/// Build a single-field validation error
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, field_error(field, message));
    AppError::Validation(errors)
}

/// A `ValidationError` carrying a human readable message
pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Turn an accumulated set of validation errors into a result
pub fn into_result(errors: ValidationErrors) -> AppResult<()> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn not_found_error(resource: &str) -> AppError {
    AppError::NotFound(format!("{} not found", resource))
}
