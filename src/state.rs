//! Shared application state
//!
//! This module defines the state passed through the Axum router: the
//! configuration, the repositories behind their traits, and the image store.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    InquiryRepository, MemoryStore, OfferRepository, PgInquiryRepository, PgOfferRepository, PgUserRepository,
    PgVehicleRepository, UserRepository, VehicleRepository,
};
use crate::services::image_storage::ImageStorage;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    pub users: Arc<dyn UserRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub inquiries: Arc<dyn InquiryRepository>,
    pub storage: ImageStorage,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, config: EnvironmentConfig) -> Self {
        let storage = ImageStorage::new(&config.upload_dir, config.public_base_url.clone());
        Self {
            jwt: JwtConfig::from(&config),
            config: Arc::new(config),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            offers: Arc::new(PgOfferRepository::new(pool.clone())),
            inquiries: Arc::new(PgInquiryRepository::new(pool)),
            storage,
        }
    }

    /// State backed by one shared in-memory store
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        let store = MemoryStore::new();
        let storage = ImageStorage::new(&config.upload_dir, config.public_base_url.clone());
        Self {
            jwt: JwtConfig::from(&config),
            config: Arc::new(config),
            users: Arc::new(store.clone()),
            vehicles: Arc::new(store.clone()),
            offers: Arc::new(store.clone()),
            inquiries: Arc::new(store),
            storage,
        }
    }
}
