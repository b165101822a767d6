use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{normalize_email, UserResponse, UserRole};
use crate::utils::errors::{into_result, AppError, AppResult};
use crate::utils::validation::{derive_errors, non_blank, parse_field, require};

// Login request. Missing fields are a plain 400, not a field list.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(self) -> AppResult<(String, String)> {
        match (non_blank(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
            _ => Err(AppError::BadRequest("Please provide email and password".to_string())),
        }
    }
}

// Register request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    pub role: Option<String>,
}

// Validated registration values
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl RegisterRequest {
    pub fn into_registration(self) -> AppResult<Registration> {
        let mut errors = derive_errors(&self);
        let name = require(&mut errors, "name", non_blank(self.name), "Name is required");
        let email = require(&mut errors, "email", non_blank(self.email), "Email is required");
        let password = require(&mut errors, "password", self.password, "Password is required");
        let role = parse_field::<UserRole>(&mut errors, "role", self.role.as_deref(), "Role must be admin or staff");
        into_result(errors)?;

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(Registration {
                name,
                email: normalize_email(&email),
                password,
                role: role.unwrap_or_default(),
            }),
            _ => Err(AppError::Internal("registration fields missing after validation".to_string())),
        }
    }
}

// Change password request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,

    // explicit rename: validator reports field-level serde renames only
    #[serde(rename = "newPassword")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: Option<String>,
}

impl ChangePasswordRequest {
    pub fn into_passwords(self) -> AppResult<(String, String)> {
        let mut errors = derive_errors(&self);
        let current = require(&mut errors, "currentPassword", self.current_password, "Current password is required");
        let new = require(&mut errors, "newPassword", self.new_password, "New password is required");
        into_result(errors)?;

        current
            .zip(new)
            .ok_or_else(|| AppError::Internal("password fields missing after validation".to_string()))
    }
}

// Login / register response data
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

// Change password response data
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
