use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

use crate::controllers::user_controller::UserController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::user_dto::UpdateUserRequest;
use crate::extractors::AppJson;
use crate::middleware::auth::{AuthenticatedUser, ADMIN_ONLY};
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_id;

/// Routes under `/api/users` (admin only)
pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", put(update_user))
}

async fn list_users(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    caller.require(ADMIN_ONLY)?;
    let controller = UserController::new(&state);
    Ok(Json(ApiResponse::success(controller.list().await?)))
}

async fn update_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let caller = caller.require(ADMIN_ONLY)?;
    let id = parse_id(&id, "User")?;
    let controller = UserController::new(&state);
    Ok(Json(ApiResponse::success(controller.update(&caller, id, request).await?)))
}
