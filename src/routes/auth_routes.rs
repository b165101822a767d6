use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, TokenResponse};
use crate::dto::common_dto::ApiResponse;
use crate::extractors::AppJson;
use crate::middleware::auth::{AuthenticatedUser, OptionalUser};
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Routes under `/api/auth`
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me))
        .route("/password", put(change_password))
}

async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.login(request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn register(
    State(state): State<AppState>,
    OptionalUser(caller): OptionalUser,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    let controller = AuthController::new(&state);
    let response = controller.register(caller, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<ApiResponse<UserResponse>> {
    let controller = AuthController::new(&state);
    Json(ApiResponse::success(controller.me(user)))
}

async fn change_password(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let controller = AuthController::new(&state);
    let response = controller.change_password(user, request).await?;
    Ok(Json(ApiResponse::success_with_message(response, "Password updated")))
}
