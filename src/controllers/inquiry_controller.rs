use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::common_dto::ListResponse;
use crate::dto::inquiry_dto::{CreateInquiryRequest, InquiryListQuery, UpdateInquiryRequest};
use crate::models::inquiry::{Inquiry, InquiryStats, InquiryVehicle, InquiryWithVehicle};
use crate::repositories::{InquiryRepository, VehicleRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

/// Customer leads
pub struct InquiryController {
    inquiries: Arc<dyn InquiryRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl InquiryController {
    pub fn new(state: &AppState) -> Self {
        Self {
            inquiries: state.inquiries.clone(),
            vehicles: state.vehicles.clone(),
        }
    }

    /// Public contact form. A linked vehicle must exist.
    pub async fn create(&self, request: CreateInquiryRequest) -> AppResult<Inquiry> {
        let inquiry = request.into_new_inquiry()?;

        if let Some(vehicle_id) = inquiry.vehicle_id {
            if self.vehicles.find_by_id(vehicle_id).await?.is_none() {
                return Err(not_found_error("Vehicle"));
            }
        }

        let inquiry = self.inquiries.create(inquiry).await?;
        tracing::info!("📨 New inquiry {} from {}", inquiry.id, inquiry.name);
        Ok(inquiry)
    }

    pub async fn list(&self, query: InquiryListQuery) -> AppResult<ListResponse<InquiryWithVehicle>> {
        let params = query.into_params()?;
        let (inquiries, total) = self.inquiries.list(params.status, &params.page).await?;

        let mut ids: Vec<Uuid> = inquiries.iter().filter_map(|i| i.vehicle_id).collect();
        ids.sort();
        ids.dedup();
        let summaries: HashMap<Uuid, InquiryVehicle> = self
            .vehicles
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|v| (v.id, InquiryVehicle::from(v)))
            .collect();

        let data = inquiries
            .into_iter()
            .map(|inquiry| InquiryWithVehicle {
                vehicle: inquiry.vehicle_id.and_then(|id| summaries.get(&id).cloned()),
                inquiry,
            })
            .collect();

        Ok(ListResponse::new(data, params.page.meta(total)))
    }

    pub async fn update_status(&self, id: Uuid, request: UpdateInquiryRequest) -> AppResult<Inquiry> {
        let status = request.into_status()?;
        self.inquiries
            .update_status(id, status)
            .await?
            .ok_or_else(|| not_found_error("Inquiry"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.inquiries.delete(id).await? {
            return Err(not_found_error("Inquiry"));
        }
        Ok(())
    }

    pub async fn stats(&self) -> AppResult<InquiryStats> {
        self.inquiries.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentConfig;
    use crate::models::inquiry::InquiryStatus;
    use crate::utils::errors::AppError;

    fn controller() -> InquiryController {
        let state = AppState::in_memory(EnvironmentConfig::local(std::env::temp_dir()));
        InquiryController::new(&state)
    }

    fn request(vehicle_id: Option<String>) -> CreateInquiryRequest {
        CreateInquiryRequest {
            name: Some("Yaw".into()),
            email: Some("".into()),
            phone: Some("+233 20 000 0000".into()),
            message: Some("Is it still available?".into()),
            vehicle_id,
        }
    }

    #[tokio::test]
    async fn test_unknown_vehicle_creates_nothing() {
        let controller = controller();
        let err = controller
            .create(request(Some(Uuid::new_v4().to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(controller.stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_status_flow() {
        let controller = controller();
        let inquiry = controller.create(request(None)).await.unwrap();
        assert_eq!(inquiry.status, InquiryStatus::New);
        assert_eq!(inquiry.email, None);

        let updated = controller
            .update_status(
                inquiry.id,
                UpdateInquiryRequest {
                    status: Some("contacted".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, InquiryStatus::Contacted);

        let stats = controller.stats().await.unwrap();
        assert_eq!((stats.total, stats.new, stats.contacted), (1, 0, 1));

        controller.delete(inquiry.id).await.unwrap();
        assert!(matches!(controller.delete(inquiry.id).await, Err(AppError::NotFound(_))));
    }
}
