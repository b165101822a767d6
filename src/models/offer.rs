//! Offer model
//!
//! Time-boxed promotions attached to a vehicle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::vehicle::{Vehicle, VehicleImage, VehicleStatus};

/// Offer row - maps to the `offers` table
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub discount_price: Option<Decimal>,
    pub discount_percentage: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub vehicle_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Flagged active and `now` inside the start/end window
    pub fn is_currently_active(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

/// Validated offer values for insert or for the merged record of an update
#[derive(Debug, Clone, PartialEq)]
pub struct OfferFields {
    pub title: String,
    pub description: Option<String>,
    pub discount_price: Option<Decimal>,
    pub discount_percentage: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub vehicle_id: Uuid,
}

impl From<&Offer> for OfferFields {
    fn from(o: &Offer) -> Self {
        Self {
            title: o.title.clone(),
            description: o.description.clone(),
            discount_price: o.discount_price,
            discount_percentage: o.discount_percentage,
            start_date: o.start_date,
            end_date: o.end_date,
            is_active: o.is_active,
            vehicle_id: o.vehicle_id,
        }
    }
}

/// Vehicle block embedded in offer responses
#[derive(Debug, Clone, Serialize)]
pub struct OfferVehicle {
    pub id: Uuid,
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub images: Vec<VehicleImage>,
    pub status: VehicleStatus,
}

impl From<&Vehicle> for OfferVehicle {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id,
            title: v.title.clone(),
            make: v.make.clone(),
            model: v.model.clone(),
            year: v.year,
            price: v.price,
            images: v.images.clone(),
            status: v.status,
        }
    }
}

/// Offer together with its vehicle summary
#[derive(Debug, Clone, Serialize)]
pub struct OfferWithVehicle {
    #[serde(flatten)]
    pub offer: Offer,
    pub vehicle: Option<OfferVehicle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn offer(is_active: bool, start_offset_days: i64, end_offset_days: i64) -> Offer {
        let now = Utc::now();
        Offer {
            id: Uuid::new_v4(),
            title: "Year-end sale".into(),
            description: None,
            discount_price: None,
            discount_percentage: Some(10),
            start_date: now + Duration::days(start_offset_days),
            end_date: now + Duration::days(end_offset_days),
            is_active,
            vehicle_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_currently_active_window() {
        let now = Utc::now();
        assert!(offer(true, -1, 1).is_currently_active(now));
        assert!(!offer(false, -1, 1).is_currently_active(now));
        assert!(!offer(true, 1, 5).is_currently_active(now));
        assert!(!offer(true, -5, -1).is_currently_active(now));
    }

    #[test]
    fn test_offer_json_shape() {
        let json = serde_json::to_value(OfferWithVehicle {
            offer: offer(true, -1, 1),
            vehicle: None,
        })
        .unwrap();
        assert_eq!(json["discountPercentage"], 10);
        assert!(json["discountPrice"].is_null());
        assert!(json.get("vehicleId").is_some());
        assert!(json["vehicle"].is_null());
    }
}
