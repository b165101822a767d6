use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::controllers::offer_controller::OfferController;
use crate::dto::common_dto::{ApiResponse, EmptyData};
use crate::dto::offer_dto::{CreateOfferRequest, OfferListQuery, UpdateOfferRequest};
use crate::extractors::{AppJson, AppQuery};
use crate::middleware::auth::{AuthenticatedUser, ADMIN_ONLY, STAFF_ROLES};
use crate::models::offer::OfferWithVehicle;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_id;

/// Routes under `/api/offers`
pub fn create_offer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_offers).post(create_offer))
        .route("/:id", get(get_offer).put(update_offer).delete(delete_offer))
}

async fn list_offers(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<OfferListQuery>,
) -> Result<Json<ApiResponse<Vec<OfferWithVehicle>>>, AppError> {
    let controller = OfferController::new(&state);
    Ok(Json(ApiResponse::success(controller.list(query).await?)))
}

async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OfferWithVehicle>>, AppError> {
    let id = parse_id(&id, "Offer")?;
    let controller = OfferController::new(&state);
    Ok(Json(ApiResponse::success(controller.get(id).await?)))
}

async fn create_offer(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    AppJson(request): AppJson<CreateOfferRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OfferWithVehicle>>), AppError> {
    caller.require(STAFF_ROLES)?;
    let controller = OfferController::new(&state);
    let offer = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(offer))))
}

async fn update_offer(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateOfferRequest>,
) -> Result<Json<ApiResponse<OfferWithVehicle>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let id = parse_id(&id, "Offer")?;
    let controller = OfferController::new(&state);
    Ok(Json(ApiResponse::success(controller.update(id, request).await?)))
}

async fn delete_offer(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, AppError> {
    caller.require(ADMIN_ONLY)?;
    let id = parse_id(&id, "Offer")?;
    let controller = OfferController::new(&state);
    controller.delete(id).await?;
    Ok(Json(ApiResponse::empty()))
}
