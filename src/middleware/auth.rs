//! JWT authentication
//!
//! This module resolves the caller from the `Authorization: Bearer` header
//! and holds the single role gate every protected route goes through.
//! The user is re-loaded on every request, so deactivating an account
//! takes effect immediately even for tokens that have not expired.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    models::user::{User, UserRole},
    state::AppState,
    utils::{
        errors::{AppError, AppResult},
        jwt::{extract_token_from_header, user_id_from_token},
    },
};

/// Roles allowed on back-office routes
pub const STAFF_ROLES: &[UserRole] = &[UserRole::Admin, UserRole::Staff];

/// Roles allowed on destructive and account-management routes
pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Fail with `Forbidden` unless `role` is one of `allowed`
pub fn require_role(allowed: &[UserRole], role: UserRole) -> AppResult<()> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            role
        )))
    }
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// Pass the role gate and hand back the user
    pub fn require(self, allowed: &[UserRole]) -> AppResult<User> {
        require_role(allowed, self.0.role)?;
        Ok(self.0)
    }
}

/// Caller if an `Authorization` header was sent. A header that is present
/// but invalid still fails the request.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

async fn authenticate(state: &AppState, header_value: &str) -> AppResult<User> {
    let token = extract_token_from_header(header_value)?;
    let user_id = user_id_from_token(token, &state.jwt)?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or(AppError::InvalidToken)?;

    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = authorization_header(parts)
            .ok_or_else(|| AppError::NotAuthorized("Not authorized to access this route".to_string()))?;

        let user = authenticate(state, header_value).await?;
        tracing::debug!("🔐 Authenticated {} ({})", user.email, user.role);
        Ok(AuthenticatedUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match authorization_header(parts) {
            Some(header_value) => Ok(OptionalUser(Some(authenticate(state, header_value).await?))),
            None => Ok(OptionalUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_role_gate() {
        assert!(require_role(STAFF_ROLES, UserRole::Staff).is_ok());
        assert!(require_role(STAFF_ROLES, UserRole::Admin).is_ok());
        assert!(require_role(ADMIN_ONLY, UserRole::Admin).is_ok());

        let err = require_role(ADMIN_ONLY, UserRole::Staff).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
