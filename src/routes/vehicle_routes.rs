use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common_dto::{ApiResponse, EmptyData, ListResponse};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleDetailResponse, VehicleListQuery};
use crate::extractors::{AppJson, AppQuery};
use crate::middleware::auth::{AuthenticatedUser, ADMIN_ONLY, STAFF_ROLES};
use crate::models::vehicle::{Vehicle, VehicleStats};
use crate::services::image_storage::{IncomingImage, MAX_IMAGES_PER_UPLOAD, MAX_IMAGE_BYTES};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_id;

/// Room for a full batch of maximum-size files plus multipart framing
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGES_PER_UPLOAD * MAX_IMAGE_BYTES + 1024 * 1024;

/// Routes under `/api/vehicles`
pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/featured", get(featured_vehicles))
        .route("/stats", get(vehicle_stats))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
        .route(
            "/:id/images",
            post(upload_images).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/:id/images/:key", delete(delete_image))
}

async fn list_vehicles(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<VehicleListQuery>,
) -> Result<Json<ListResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(controller.list(query).await?))
}

async fn featured_vehicles(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(ApiResponse::success(controller.featured().await?)))
}

async fn vehicle_stats(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<ApiResponse<VehicleStats>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let controller = VehicleController::new(&state);
    Ok(Json(ApiResponse::success(controller.stats().await?)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VehicleDetailResponse>>, AppError> {
    let id = parse_id(&id, "Vehicle")?;
    let controller = VehicleController::new(&state);
    Ok(Json(ApiResponse::success(controller.get(id).await?)))
}

async fn create_vehicle(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    AppJson(request): AppJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    caller.require(STAFF_ROLES)?;
    let controller = VehicleController::new(&state);
    let vehicle = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle))))
}

async fn update_vehicle(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let id = parse_id(&id, "Vehicle")?;
    let controller = VehicleController::new(&state);
    Ok(Json(ApiResponse::success(controller.update(id, request).await?)))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, AppError> {
    caller.require(ADMIN_ONLY)?;
    let id = parse_id(&id, "Vehicle")?;
    let controller = VehicleController::new(&state);
    controller.delete(id).await?;
    Ok(Json(ApiResponse::empty()))
}

async fn upload_images(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let id = parse_id(&id, "Vehicle")?;
    let multipart = multipart.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let images = read_images(multipart).await?;

    let controller = VehicleController::new(&state);
    let vehicle = controller.upload_images(id, images).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Images uploaded")))
}

/// Collect the `images` / `images[]` file parts; any other field is rejected
async fn read_images(mut multipart: Multipart) -> Result<Vec<IncomingImage>, AppError> {
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name != "images" && name != "images[]" {
            return Err(AppError::UploadConstraint(format!("Unexpected field '{}'", name)));
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        images.push(IncomingImage {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Ok(images)
}

async fn delete_image(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path((id, key)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    caller.require(STAFF_ROLES)?;
    let id = parse_id(&id, "Vehicle")?;
    let controller = VehicleController::new(&state);
    Ok(Json(ApiResponse::success(controller.delete_image(id, &key).await?)))
}
