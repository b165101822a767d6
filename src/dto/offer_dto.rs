use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::offer::{Offer, OfferFields};
use crate::utils::errors::{field_error, into_result, AppError, AppResult};
use crate::utils::serde_helpers::{nullable_number, optional_number};
use crate::utils::validation::{check_amount, derive_errors, non_blank, parse_iso8601, require};

// Offer creation request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "optional_number")]
    pub discount_price: Option<Decimal>,

    #[serde(default, deserialize_with = "optional_number")]
    pub discount_percentage: Option<i32>,

    pub start_date: Option<String>,

    pub end_date: Option<String>,

    pub is_active: Option<bool>,

    pub vehicle_id: Option<String>,
}

// Partial offer update; omitted fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "nullable_number")]
    pub discount_price: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "nullable_number")]
    pub discount_percentage: Option<Option<i32>>,

    pub start_date: Option<String>,

    pub end_date: Option<String>,

    pub is_active: Option<bool>,

    pub vehicle_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferListQuery {
    pub active: Option<String>,
}

impl OfferListQuery {
    /// `?active=true` restricts the list to currently active offers
    pub fn active_only(&self) -> bool {
        self.active
            .as_deref()
            .map_or(false, |v| v.trim().eq_ignore_ascii_case("true"))
    }
}

fn parse_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    message: &'static str,
) -> Option<DateTime<Utc>> {
    let parsed = value.and_then(parse_iso8601);
    if parsed.is_none() {
        errors.add(field, field_error("iso8601", message));
    }
    parsed
}

fn parse_vehicle_id(errors: &mut ValidationErrors, value: &str) -> Option<Uuid> {
    match Uuid::parse_str(value.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add("vehicleId", field_error("uuid", "Vehicle ID is not valid"));
            None
        }
    }
}

fn check_discounts(errors: &mut ValidationErrors, price: Option<Decimal>, percentage: Option<i32>) {
    check_amount(
        errors,
        "discountPrice",
        price,
        "Discount price must be zero or greater",
        "Discount price is too large",
    );
    if percentage.map_or(false, |p| !(0..=100).contains(&p)) {
        errors.add("discountPercentage", field_error("range", "Discount percentage must be between 0 and 100"));
    }
}

fn check_window(errors: &mut ValidationErrors, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add("endDate", field_error("date_range", "End date must be on or after the start date"));
        }
    }
}

impl CreateOfferRequest {
    pub fn into_fields(self) -> AppResult<OfferFields> {
        let mut errors = derive_errors(&self);

        let title = require(&mut errors, "title", non_blank(self.title), "Title is required");
        let vehicle_id = match non_blank(self.vehicle_id) {
            Some(raw) => parse_vehicle_id(&mut errors, &raw),
            None => require(&mut errors, "vehicleId", None, "Vehicle is required"),
        };
        let start = parse_date(&mut errors, "startDate", self.start_date.as_deref(), "Valid start date is required");
        let end = parse_date(&mut errors, "endDate", self.end_date.as_deref(), "Valid end date is required");
        check_window(&mut errors, start, end);
        check_discounts(&mut errors, self.discount_price, self.discount_percentage);

        into_result(errors)?;

        match (title, vehicle_id, start, end) {
            (Some(title), Some(vehicle_id), Some(start_date), Some(end_date)) => Ok(OfferFields {
                title,
                description: non_blank(self.description),
                discount_price: self.discount_price.map(|p| p.round_dp(2)),
                discount_percentage: self.discount_percentage,
                start_date,
                end_date,
                is_active: self.is_active.unwrap_or(true),
                vehicle_id,
            }),
            _ => Err(AppError::Internal("offer fields missing after validation".to_string())),
        }
    }
}

impl UpdateOfferRequest {
    /// Overlay on `current`; the merged window and discounts are revalidated
    pub fn merge(self, current: &Offer) -> AppResult<OfferFields> {
        let mut errors = derive_errors(&self);
        let mut merged = OfferFields::from(current);

        if let Some(title) = self.title {
            match non_blank(Some(title)) {
                Some(title) => merged.title = title,
                None => errors.add("title", field_error("required", "Title is required")),
            }
        }
        if let Some(description) = self.description {
            merged.description = non_blank(Some(description));
        }
        if let Some(raw) = self.vehicle_id {
            if let Some(id) = parse_vehicle_id(&mut errors, &raw) {
                merged.vehicle_id = id;
            }
        }
        if self.start_date.is_some() {
            if let Some(start) = parse_date(&mut errors, "startDate", self.start_date.as_deref(), "Valid start date is required") {
                merged.start_date = start;
            }
        }
        if self.end_date.is_some() {
            if let Some(end) = parse_date(&mut errors, "endDate", self.end_date.as_deref(), "Valid end date is required") {
                merged.end_date = end;
            }
        }
        if let Some(price) = self.discount_price {
            merged.discount_price = price.map(|p| p.round_dp(2));
        }
        if let Some(percentage) = self.discount_percentage {
            merged.discount_percentage = percentage;
        }
        merged.is_active = self.is_active.unwrap_or(merged.is_active);

        check_window(&mut errors, Some(merged.start_date), Some(merged.end_date));
        check_discounts(&mut errors, merged.discount_price, merged.discount_percentage);

        into_result(errors)?;
        Ok(merged)
    }
}
