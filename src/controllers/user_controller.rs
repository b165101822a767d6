use std::sync::Arc;
use uuid::Uuid;

use crate::dto::user_dto::UpdateUserRequest;
use crate::models::user::{User, UserResponse, UserRole};
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Account administration. Every operation here is admin-only; the route
/// layer applies the gate.
pub struct UserController {
    users: Arc<dyn UserRepository>,
}

impl UserController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn update(&self, caller: &User, id: Uuid, request: UpdateUserRequest) -> AppResult<UserResponse> {
        let changes = request.into_changes()?;

        if caller.id == id {
            let deactivates = changes.is_active == Some(false);
            let demotes = changes.role.map_or(false, |role| role != UserRole::Admin);
            if deactivates || demotes {
                return Err(AppError::BadRequest(
                    "You cannot deactivate or demote your own account".to_string(),
                ));
            }
        }

        let user = self
            .users
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found_error("User"))?;

        tracing::info!("👤 {} updated account {}", caller.email, user.email);
        Ok(UserResponse::from(user))
    }
}
