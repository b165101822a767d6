//! HTTP surface
//!
//! `create_router` assembles every `/api` route group, the static upload
//! directory and the shared layers (tracing, compression, CORS).

pub mod auth_routes;
pub mod inquiry_routes;
pub mod offer_routes;
pub mod user_routes;
pub mod vehicle_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::cors::cors_layer;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router())
        .nest("/api/users", user_routes::create_user_router())
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/offers", offer_routes::create_offer_router())
        .nest("/api/inquiries", inquiry_routes::create_inquiry_router())
        .nest_service("/uploads", uploads)
        .fallback(route_not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "ok",
        "service": "dealership-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
