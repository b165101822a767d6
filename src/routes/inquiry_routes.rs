use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::controllers::inquiry_controller::InquiryController;
use crate::dto::common_dto::{ApiResponse, EmptyData, ListResponse};
use crate::dto::inquiry_dto::{CreateInquiryRequest, InquiryListQuery, UpdateInquiryRequest, THANK_YOU_MESSAGE};
use crate::extractors::{AppJson, AppQuery};
use crate::middleware::auth::{AuthenticatedUser, ADMIN_ONLY, STAFF_ROLES};
use crate::models::inquiry::{Inquiry, InquiryStats, InquiryWithVehicle};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_id;

/// Routes under `/api/inquiries`
pub fn create_inquiry_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inquiries).post(create_inquiry))
        .route("/stats", get(inquiry_stats))
        .route("/:id", put(update_inquiry).delete(delete_inquiry))
}

async fn create_inquiry(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateInquiryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Inquiry>>), AppError> {
    let controller = InquiryController::new(&state);
    let inquiry = controller.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(inquiry, THANK_YOU_MESSAGE)),
    ))
}

async fn list_inquiries(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    AppQuery(query): AppQuery<InquiryListQuery>,
) -> Result<Json<ListResponse<InquiryWithVehicle>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let controller = InquiryController::new(&state);
    Ok(Json(controller.list(query).await?))
}

async fn inquiry_stats(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<InquiryStats>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let controller = InquiryController::new(&state);
    Ok(Json(ApiResponse::success(controller.stats().await?)))
}

async fn update_inquiry(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateInquiryRequest>,
) -> Result<Json<ApiResponse<Inquiry>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let id = parse_id(&id, "Inquiry")?;
    let controller = InquiryController::new(&state);
    Ok(Json(ApiResponse::success(controller.update_status(id, request).await?)))
}

async fn delete_inquiry(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, AppError> {
    caller.require(ADMIN_ONLY)?;
    let id = parse_id(&id, "Inquiry")?;
    let controller = InquiryController::new(&state);
    controller.delete(id).await?;
    Ok(Json(ApiResponse::empty()))
}
