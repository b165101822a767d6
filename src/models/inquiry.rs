//! Inquiry model
//!
//! Leads submitted from the public contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::vehicle::Vehicle;

/// Follow-up status - maps to the `inquiry_status` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "inquiry_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl FromStr for InquiryStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(InquiryStatus::New),
            "contacted" => Ok(InquiryStatus::Contacted),
            "closed" => Ok(InquiryStatus::Closed),
            _ => Err(()),
        }
    }
}

/// Inquiry row - maps to the `inquiries` table
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub message: String,
    pub vehicle_id: Option<Uuid>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub message: String,
    pub vehicle_id: Option<Uuid>,
}

/// Vehicle block embedded in inquiry listings
#[derive(Debug, Clone, Serialize)]
pub struct InquiryVehicle {
    pub id: Uuid,
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl From<&Vehicle> for InquiryVehicle {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id,
            title: v.title.clone(),
            make: v.make.clone(),
            model: v.model.clone(),
            year: v.year,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InquiryWithVehicle {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub vehicle: Option<InquiryVehicle>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct InquiryStats {
    pub total: i64,
    pub new: i64,
    pub contacted: i64,
    pub closed: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("contacted".parse::<InquiryStatus>(), Ok(InquiryStatus::Contacted));
        assert_eq!("NEW".parse::<InquiryStatus>(), Ok(InquiryStatus::New));
        assert!("archived".parse::<InquiryStatus>().is_err());
        assert_eq!(InquiryStatus::default(), InquiryStatus::New);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(InquiryStatus::Closed).unwrap(), "closed");
    }
}
