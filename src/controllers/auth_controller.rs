//! Authentication operations
//!
//! Login, registration (with the first-user bootstrap), current user and
//! password change. Hashing happens here, at the write boundary, and
//! nowhere else.

use std::sync::Arc;

use crate::config::environment::BootstrapAdmin;
use crate::dto::auth_dto::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, TokenResponse};
use crate::middleware::auth::{require_role, ADMIN_ONLY};
use crate::models::user::{normalize_email, NewUser, User, UserResponse, UserRole};
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::password::{hash_password, verify_against_dummy, verify_password};

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            jwt: state.jwt.clone(),
            bcrypt_cost: state.config.bcrypt_cost,
        }
    }

    /// Unknown email, wrong password and inactive account all fail the same way
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let (email, password) = request.credentials()?;

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                verify_against_dummy(&password, self.bcrypt_cost).await;
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(&password, &user.password_hash).await? || !user.is_active {
            tracing::debug!("🔒 Rejected login for {}", email);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("🔑 {} logged in", user.email);
        self.auth_response(user)
    }

    /// Open while the system has no users; afterwards an admin caller is required.
    /// The first account is always an admin, whatever role was requested.
    pub async fn register(&self, caller: Option<User>, request: RegisterRequest) -> AppResult<AuthResponse> {
        if let Some(caller) = &caller {
            require_role(ADMIN_ONLY, caller.role)?;
        } else if self.users.count().await? > 0 {
            // rechecked under the table lock in `create`
            return Err(not_authorized());
        }

        let registration = request.into_registration()?;
        let password_hash = hash_password(&registration.password, self.bcrypt_cost).await?;

        let caller_role = caller.as_ref().map(|user| user.role);
        let requested_role = registration.role;
        let resolve_role = move |existing: i64| -> AppResult<UserRole> {
            if existing == 0 {
                return Ok(UserRole::Admin);
            }
            let role = caller_role.ok_or_else(not_authorized)?;
            require_role(ADMIN_ONLY, role)?;
            Ok(requested_role)
        };

        let user = self
            .users
            .create(
                NewUser {
                    name: registration.name,
                    email: registration.email,
                    password_hash,
                    role: requested_role,
                },
                &resolve_role,
            )
            .await?;

        tracing::info!("👤 Registered {} as {}", user.email, user.role);
        self.auth_response(user)
    }

    pub fn me(&self, user: User) -> UserResponse {
        UserResponse::from(user)
    }

    /// Re-prove the current password, store the new hash, issue a fresh token
    pub async fn change_password(&self, user: User, request: ChangePasswordRequest) -> AppResult<TokenResponse> {
        let (current, new) = request.into_passwords()?;

        if !verify_password(&current, &user.password_hash).await? {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }

        let password_hash = hash_password(&new, self.bcrypt_cost).await?;
        if !self.users.update_password(user.id, &password_hash).await? {
            return Err(not_found_error("User"));
        }

        tracing::info!("🔑 Password changed for {}", user.email);
        Ok(TokenResponse {
            token: generate_token(user.id, user.role, &self.jwt)?,
        })
    }

    /// Create the configured admin account unless an admin already exists.
    /// Returns the new account, if one was created.
    pub async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> AppResult<Option<User>> {
        if self.users.count_by_role(UserRole::Admin).await? > 0 {
            return Ok(None);
        }

        let password_hash = hash_password(&admin.password, self.bcrypt_cost).await?;
        let resolve_role = |_: i64| -> AppResult<UserRole> { Ok(UserRole::Admin) };
        let user = self
            .users
            .create(
                NewUser {
                    name: admin.name.clone(),
                    email: normalize_email(&admin.email),
                    password_hash,
                    role: UserRole::Admin,
                },
                &resolve_role,
            )
            .await?;

        Ok(Some(user))
    }

    fn auth_response(&self, user: User) -> AppResult<AuthResponse> {
        let token = generate_token(user.id, user.role, &self.jwt)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }
}

fn not_authorized() -> AppError {
    AppError::NotAuthorized("Not authorized to access this route".to_string())
}
