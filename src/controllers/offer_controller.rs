use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::offer_dto::{CreateOfferRequest, OfferListQuery, UpdateOfferRequest};
use crate::models::offer::{Offer, OfferVehicle, OfferWithVehicle};
use crate::repositories::{OfferRepository, VehicleRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

/// Promotions. Every offer is returned with a summary of its vehicle.
pub struct OfferController {
    offers: Arc<dyn OfferRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl OfferController {
    pub fn new(state: &AppState) -> Self {
        Self {
            offers: state.offers.clone(),
            vehicles: state.vehicles.clone(),
        }
    }

    pub async fn list(&self, query: OfferListQuery) -> AppResult<Vec<OfferWithVehicle>> {
        let active_at = query.active_only().then(Utc::now);
        let offers = self.offers.list(active_at).await?;
        self.with_vehicles(offers).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<OfferWithVehicle> {
        let offer = self
            .offers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Offer"))?;
        self.with_vehicle(offer).await
    }

    pub async fn create(&self, request: CreateOfferRequest) -> AppResult<OfferWithVehicle> {
        let fields = request.into_fields()?;
        self.ensure_vehicle(fields.vehicle_id).await?;

        let offer = self.offers.create(fields).await?;
        tracing::info!("🏷️ Offer {} created for vehicle {}", offer.id, offer.vehicle_id);
        self.with_vehicle(offer).await
    }

    pub async fn update(&self, id: Uuid, request: UpdateOfferRequest) -> AppResult<OfferWithVehicle> {
        let current = self
            .offers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Offer"))?;

        let fields = request.merge(&current)?;
        if fields.vehicle_id != current.vehicle_id {
            self.ensure_vehicle(fields.vehicle_id).await?;
        }

        let offer = self
            .offers
            .update(id, fields)
            .await?
            .ok_or_else(|| not_found_error("Offer"))?;
        self.with_vehicle(offer).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.offers.delete(id).await? {
            return Err(not_found_error("Offer"));
        }
        Ok(())
    }

    async fn ensure_vehicle(&self, vehicle_id: Uuid) -> AppResult<()> {
        match self.vehicles.find_by_id(vehicle_id).await? {
            Some(_) => Ok(()),
            None => Err(not_found_error("Vehicle")),
        }
    }

    async fn with_vehicle(&self, offer: Offer) -> AppResult<OfferWithVehicle> {
        let vehicle = self.vehicles.find_by_id(offer.vehicle_id).await?;
        Ok(OfferWithVehicle {
            vehicle: vehicle.as_ref().map(OfferVehicle::from),
            offer,
        })
    }

    async fn with_vehicles(&self, offers: Vec<Offer>) -> AppResult<Vec<OfferWithVehicle>> {
        let mut ids: Vec<Uuid> = offers.iter().map(|o| o.vehicle_id).collect();
        ids.sort();
        ids.dedup();

        let summaries: HashMap<Uuid, OfferVehicle> = self
            .vehicles
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|v| (v.id, OfferVehicle::from(v)))
            .collect();

        Ok(offers
            .into_iter()
            .map(|offer| OfferWithVehicle {
                vehicle: summaries.get(&offer.vehicle_id).cloned(),
                offer,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::models::vehicle::{Vehicle, VehicleFields};
    use crate::utils::errors::AppError;
    use chrono::Duration;

    async fn setup() -> (OfferController, Vehicle) {
        let state = AppState::in_memory(EnvironmentConfig::local(std::env::temp_dir()));
        let fields: VehicleFields = serde_json::from_value::<crate::dto::vehicle_dto::CreateVehicleRequest>(
            serde_json::json!({"make": "Honda", "model": "Civic", "year": 2019, "price": 95000}),
        )
        .unwrap()
        .into_fields()
        .unwrap();
        let vehicle = state.vehicles.create(fields).await.unwrap();
        (OfferController::new(&state), vehicle)
    }

    fn request(vehicle_id: Uuid, start: &str, end: &str) -> CreateOfferRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Weekend deal",
            "vehicleId": vehicle_id.to_string(),
            "discountPercentage": 10,
            "startDate": start,
            "endDate": end
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_inverted_window_persists_nothing() {
        let (controller, vehicle) = setup().await;
        let err = controller
            .create(request(vehicle.id, "2030-02-01", "2030-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(controller.list(OfferListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_not_found() {
        let (controller, _) = setup().await;
        let err = controller
            .create(request(Uuid::new_v4(), "2030-01-01", "2030-02-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Vehicle not found"));
    }

    #[tokio::test]
    async fn test_active_filter_and_summary() {
        let (controller, vehicle) = setup().await;
        let now = Utc::now();
        let running = request(
            vehicle.id,
            &(now - Duration::days(1)).to_rfc3339(),
            &(now + Duration::days(1)).to_rfc3339(),
        );
        controller.create(running).await.unwrap();
        controller
            .create(request(vehicle.id, "2030-01-01", "2030-02-01"))
            .await
            .unwrap();

        let all = controller.list(OfferListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = controller
            .list(OfferListQuery {
                active: Some("true".into()),
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].vehicle.as_ref().unwrap().make, "Honda");
    }
}
