//! Vehicle catalog operations
//!
//! Search, detail (with the view counter and active offers), CRUD and the
//! image lifecycle. Image files are written before the record is saved;
//! when anything fails part way, every file written by that call is
//! removed again before the error is returned.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::common_dto::ListResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleDetailResponse, VehicleListQuery};
use crate::models::vehicle::{Vehicle, VehicleImage, VehicleStats};
use crate::repositories::{OfferRepository, VehicleRepository};
use crate::services::image_storage::{validate_image, ImageStorage, IncomingImage, MAX_IMAGES_PER_UPLOAD};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

pub const FEATURED_LIMIT: i64 = 6;

pub struct VehicleController {
    vehicles: Arc<dyn VehicleRepository>,
    offers: Arc<dyn OfferRepository>,
    storage: ImageStorage,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            vehicles: state.vehicles.clone(),
            offers: state.offers.clone(),
            storage: state.storage.clone(),
        }
    }

    pub async fn list(&self, query: VehicleListQuery) -> AppResult<ListResponse<Vehicle>> {
        let query = query.into_query()?;
        let (vehicles, total) = self.vehicles.list(&query).await?;
        Ok(ListResponse::new(vehicles, query.page.meta(total)))
    }

    pub async fn featured(&self) -> AppResult<Vec<Vehicle>> {
        self.vehicles.featured(FEATURED_LIMIT).await
    }

    /// Counts one view per call
    pub async fn get(&self, id: Uuid) -> AppResult<VehicleDetailResponse> {
        let vehicle = self
            .vehicles
            .increment_views(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        let offers = self.offers.active_for_vehicle(id, Utc::now()).await?;
        Ok(VehicleDetailResponse { vehicle, offers })
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        let fields = request.into_fields()?;
        let vehicle = self.vehicles.create(fields).await?;
        tracing::info!("🚗 Vehicle {} created ({})", vehicle.id, vehicle.title);
        Ok(vehicle)
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        let current = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        let fields = request.merge(&current)?;

        self.vehicles
            .update(id, fields)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let removed = self
            .vehicles
            .delete(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;

        for image in &removed.images {
            self.remove_file(&image.storage_key).await;
        }

        tracing::info!("🗑️ Vehicle {} deleted with {} image(s)", id, removed.images.len());
        Ok(())
    }

    /// Append uploaded images to the vehicle's list
    pub async fn upload_images(&self, id: Uuid, images: Vec<IncomingImage>) -> AppResult<Vehicle> {
        if self.vehicles.find_by_id(id).await?.is_none() {
            return Err(not_found_error("Vehicle"));
        }
        if images.is_empty() {
            return Err(validation_error("images", "Please upload at least one image"));
        }
        if images.len() > MAX_IMAGES_PER_UPLOAD {
            return Err(AppError::UploadConstraint(format!(
                "You can upload at most {} images at a time",
                MAX_IMAGES_PER_UPLOAD
            )));
        }

        let mut written = Vec::with_capacity(images.len());
        let result = self.store_and_attach(id, &images, &mut written).await;

        if let Err(e) = &result {
            tracing::warn!("⚠️ Upload for vehicle {} failed ({}), discarding {} file(s)", id, e, written.len());
            for key in &written {
                self.remove_file(key).await;
            }
        }
        result
    }

    async fn store_and_attach(
        &self,
        id: Uuid,
        images: &[IncomingImage],
        written: &mut Vec<String>,
    ) -> AppResult<Vehicle> {
        let mut entries = Vec::with_capacity(images.len());

        for image in images {
            let extension = validate_image(image)?;
            let key = ImageStorage::new_key(id, extension);
            self.storage.write(&key, &image.bytes).await?;
            written.push(key.clone());
            entries.push(VehicleImage {
                url: self.storage.url_for(&key),
                storage_key: key,
            });
        }

        let vehicle = self
            .vehicles
            .append_images(id, &entries)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;

        tracing::info!("📷 {} image(s) added to vehicle {}", entries.len(), id);
        Ok(vehicle)
    }

    pub async fn delete_image(&self, id: Uuid, key: &str) -> AppResult<Vehicle> {
        if !ImageStorage::is_valid_key(key) {
            return Err(not_found_error("Image"));
        }

        let vehicle = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        if !vehicle.images.iter().any(|image| image.storage_key == key) {
            return Err(not_found_error("Image"));
        }

        let vehicle = self
            .vehicles
            .remove_image(id, key)
            .await?
            .ok_or_else(|| not_found_error("Vehicle"))?;
        self.remove_file(key).await;

        Ok(vehicle)
    }

    pub async fn stats(&self) -> AppResult<VehicleStats> {
        self.vehicles.stats().await
    }

    /// Delete stored files no vehicle references. Returns how many were removed.
    pub async fn reconcile_image_storage(&self) -> AppResult<usize> {
        let referenced: HashSet<String> = self.vehicles.referenced_image_keys().await?.into_iter().collect();

        let mut removed = 0;
        for key in self.storage.list_keys().await? {
            if referenced.contains(&key) {
                continue;
            }
            if self.storage.delete(&key).await? {
                tracing::debug!("🧹 Removed orphaned image {}", key);
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn remove_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!("⚠️ Could not delete image file {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use tempfile::TempDir;

    fn setup() -> (TempDir, VehicleController) {
        let dir = TempDir::new().unwrap();
        let state = AppState::in_memory(EnvironmentConfig::local(dir.path()));
        (dir, VehicleController::new(&state))
    }

    fn hilux() -> CreateVehicleRequest {
        serde_json::from_value(serde_json::json!({
            "make": "Toyota",
            "model": "Hilux",
            "year": 2021,
            "price": 4800000
        }))
        .unwrap()
    }

    fn png(name: &str, size: usize) -> IncomingImage {
        IncomingImage {
            file_name: Some(name.to_string()),
            content_type: Some("image/png".to_string()),
            bytes: vec![7; size],
        }
    }

    #[tokio::test]
    async fn test_get_counts_views() {
        let (_dir, controller) = setup();
        let vehicle = controller.create(hilux()).await.unwrap();
        assert_eq!(vehicle.views, 0);

        for _ in 0..3 {
            controller.get(vehicle.id).await.unwrap();
        }
        assert_eq!(controller.get(vehicle.id).await.unwrap().vehicle.views, 4);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_no_files() {
        let (_dir, controller) = setup();
        let vehicle = controller.create(hilux()).await.unwrap();

        let images = vec![png("a.png", 10), png("b.png", 6 * 1024 * 1024), png("c.png", 10)];
        let err = controller.upload_images(vehicle.id, images).await.unwrap_err();
        assert!(matches!(err, AppError::UploadConstraint(_)));

        assert!(controller.storage.list_keys().await.unwrap().is_empty());
        let stored = controller.vehicles.find_by_id(vehicle.id).await.unwrap().unwrap();
        assert!(stored.images.is_empty());
    }

    #[tokio::test]
    async fn test_upload_then_delete_image() {
        let (_dir, controller) = setup();
        let vehicle = controller.create(hilux()).await.unwrap();

        let updated = controller
            .upload_images(vehicle.id, vec![png("a.png", 10), png("b.png", 10)])
            .await
            .unwrap();
        assert_eq!(updated.images.len(), 2);

        let key = updated.images[0].storage_key.clone();
        let updated = controller.delete_image(vehicle.id, &key).await.unwrap();
        assert_eq!(updated.images.len(), 1);
        assert!(!controller.storage.exists(&key).await);

        let err = controller.delete_image(vehicle.id, "../etc/passwd").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_limits() {
        let (_dir, controller) = setup();
        let vehicle = controller.create(hilux()).await.unwrap();

        let err = controller.upload_images(vehicle.id, Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let many = (0..11).map(|i| png(&format!("{}.png", i), 10)).collect();
        let err = controller.upload_images(vehicle.id, many).await.unwrap_err();
        assert!(matches!(err, AppError::UploadConstraint(_)));

        let err = controller.upload_images(Uuid::new_v4(), vec![png("a.png", 10)]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reconcile_removes_orphans_only() {
        let (_dir, controller) = setup();
        let vehicle = controller.create(hilux()).await.unwrap();
        let updated = controller.upload_images(vehicle.id, vec![png("a.png", 10)]).await.unwrap();
        let kept = updated.images[0].storage_key.clone();

        let orphan = ImageStorage::new_key(Uuid::new_v4(), "jpg");
        controller.storage.write(&orphan, b"left over").await.unwrap();

        assert_eq!(controller.reconcile_image_storage().await.unwrap(), 1);
        assert_eq!(controller.storage.list_keys().await.unwrap(), vec![kept]);
    }
}
