use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::offer::Offer;
use crate::models::pagination::Pagination;
use crate::models::vehicle::{
    default_title, FuelType, SortOrder, Transmission, Vehicle, VehicleFields, VehicleFilter, VehicleQuery,
    VehicleSort, VehicleStatus,
};
use crate::utils::errors::{field_error, into_result, AppError, AppResult};
use crate::utils::serde_helpers::{nullable_number, optional_number};
use crate::utils::validation::{
    check_amount, check_non_negative, derive_errors, non_blank, parse_field, require, validate_model_year,
};

pub const DEFAULT_PAGE_SIZE: i64 = 12;

// Vehicle creation request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 100, message = "Make must be at most 100 characters"))]
    pub make: Option<String>,

    #[validate(length(max = 100, message = "Model must be at most 100 characters"))]
    pub model: Option<String>,

    #[serde(default, deserialize_with = "optional_number")]
    pub year: Option<i32>,

    #[serde(default, deserialize_with = "optional_number")]
    pub price: Option<Decimal>,

    #[serde(default, deserialize_with = "optional_number")]
    pub mileage: Option<i32>,

    pub transmission: Option<String>,

    pub fuel_type: Option<String>,

    #[serde(rename = "engineSize")]
    #[validate(length(max = 50, message = "Engine size must be at most 50 characters"))]
    pub engine_size: Option<String>,

    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,

    #[serde(rename = "bodyType")]
    #[validate(length(max = 50, message = "Body type must be at most 50 characters"))]
    pub body_type: Option<String>,

    pub description: Option<String>,

    pub status: Option<String>,

    pub featured: Option<bool>,
}

// Vehicle update request: every field optional, merged over the stored record
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 100, message = "Make must be at most 100 characters"))]
    pub make: Option<String>,

    #[validate(length(max = 100, message = "Model must be at most 100 characters"))]
    pub model: Option<String>,

    #[serde(default, deserialize_with = "optional_number")]
    pub year: Option<i32>,

    #[serde(default, deserialize_with = "optional_number")]
    pub price: Option<Decimal>,

    /// `null` or `""` clears the stored mileage
    #[serde(default, deserialize_with = "nullable_number")]
    pub mileage: Option<Option<i32>>,

    pub transmission: Option<String>,

    pub fuel_type: Option<String>,

    #[serde(rename = "engineSize")]
    #[validate(length(max = 50, message = "Engine size must be at most 50 characters"))]
    pub engine_size: Option<String>,

    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,

    #[serde(rename = "bodyType")]
    #[validate(length(max = 50, message = "Body type must be at most 50 characters"))]
    pub body_type: Option<String>,

    pub description: Option<String>,

    pub status: Option<String>,

    pub featured: Option<bool>,
}

fn check_numbers(errors: &mut ValidationErrors, year: Option<i32>, price: Option<Decimal>, mileage: Option<i32>) {
    if let Some(year) = year {
        if let Err(error) = validate_model_year(year) {
            errors.add("year", error);
        }
    }
    check_amount(errors, "price", price, "Price must be zero or greater", "Price is too large");
    check_non_negative(errors, "mileage", mileage, "Mileage must be zero or greater");
}

fn parse_transmission(errors: &mut ValidationErrors, value: Option<&str>) -> Option<Transmission> {
    parse_field(errors, "transmission", value, "Transmission must be Automatic or Manual")
}

fn parse_fuel_type(errors: &mut ValidationErrors, value: Option<&str>) -> Option<FuelType> {
    parse_field(errors, "fuelType", value, "Fuel type must be Petrol, Diesel, Hybrid or Electric")
}

fn parse_status(errors: &mut ValidationErrors, value: Option<&str>) -> Option<VehicleStatus> {
    parse_field(errors, "status", value, "Status must be available, reserved or sold")
}

/// A provided required text field must not be blank; absent keeps `current`
fn merge_required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
    current: &str,
    message: &'static str,
) -> String {
    match value {
        None => current.to_string(),
        Some(v) => match non_blank(Some(v)) {
            Some(v) => v,
            None => {
                errors.add(field, field_error("required", message));
                current.to_string()
            }
        },
    }
}

/// A provided optional text field replaces the stored one; blank clears it
fn merge_optional(value: Option<String>, current: &Option<String>) -> Option<String> {
    match value {
        None => current.clone(),
        Some(v) => non_blank(Some(v)),
    }
}

impl CreateVehicleRequest {
    /// Validate every field, reporting all violations at once
    pub fn into_fields(self) -> AppResult<VehicleFields> {
        let mut errors = derive_errors(&self);

        let make = require(&mut errors, "make", non_blank(self.make), "Make is required");
        let model = require(&mut errors, "model", non_blank(self.model), "Model is required");
        let year = require(&mut errors, "year", self.year, "Valid year is required");
        let price = require(&mut errors, "price", self.price, "Valid price is required");
        check_numbers(&mut errors, year, price, self.mileage);

        let transmission = parse_transmission(&mut errors, self.transmission.as_deref());
        let fuel_type = parse_fuel_type(&mut errors, self.fuel_type.as_deref());
        let status = parse_status(&mut errors, self.status.as_deref());

        into_result(errors)?;

        let (make, model, year, price) = match (make, model, year, price) {
            (Some(make), Some(model), Some(year), Some(price)) => (make, model, year, price),
            _ => return Err(AppError::Internal("vehicle fields missing after validation".to_string())),
        };

        Ok(VehicleFields {
            title: non_blank(self.title).unwrap_or_else(|| default_title(year, &make, &model)),
            make,
            model,
            year,
            price: price.round_dp(2),
            mileage: self.mileage,
            transmission: transmission.unwrap_or_default(),
            fuel_type: fuel_type.unwrap_or_default(),
            engine_size: non_blank(self.engine_size),
            color: non_blank(self.color),
            body_type: non_blank(self.body_type),
            description: non_blank(self.description),
            status: status.unwrap_or_default(),
            featured: self.featured.unwrap_or(false),
        })
    }
}

impl UpdateVehicleRequest {
    /// Overlay the provided fields on `current` and revalidate the result
    pub fn merge(self, current: &Vehicle) -> AppResult<VehicleFields> {
        let mut errors = derive_errors(&self);

        let make = merge_required(&mut errors, "make", self.make, &current.make, "Make is required");
        let model = merge_required(&mut errors, "model", self.model, &current.model, "Model is required");
        let year = self.year.unwrap_or(current.year);
        let price = self.price.unwrap_or(current.price);
        let mileage = self.mileage.unwrap_or(current.mileage);
        check_numbers(&mut errors, Some(year), Some(price), mileage);

        let transmission = parse_transmission(&mut errors, self.transmission.as_deref());
        let fuel_type = parse_fuel_type(&mut errors, self.fuel_type.as_deref());
        let status = parse_status(&mut errors, self.status.as_deref());

        into_result(errors)?;

        let title = match self.title {
            None => current.title.clone(),
            Some(title) => non_blank(Some(title)).unwrap_or_else(|| default_title(year, &make, &model)),
        };

        Ok(VehicleFields {
            title,
            make,
            model,
            year,
            price: price.round_dp(2),
            mileage,
            transmission: transmission.unwrap_or(current.transmission),
            fuel_type: fuel_type.unwrap_or(current.fuel_type),
            engine_size: merge_optional(self.engine_size, &current.engine_size),
            color: merge_optional(self.color, &current.color),
            body_type: merge_optional(self.body_type, &current.body_type),
            description: merge_optional(self.description, &current.description),
            status: status.unwrap_or(current.status),
            featured: self.featured.unwrap_or(current.featured),
        })
    }
}

// Catalog query string. Values stay raw strings so every bad one can be reported.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListQuery {
    pub search: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub status: Option<String>,
    pub featured: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl VehicleListQuery {
    pub fn into_query(self) -> AppResult<VehicleQuery> {
        let mut errors = ValidationErrors::new();

        let featured = self.featured.as_deref().map(str::to_ascii_lowercase);
        let filter = VehicleFilter {
            search: non_blank(self.search),
            make: non_blank(self.make),
            model: non_blank(self.model),
            transmission: parse_transmission(&mut errors, self.transmission.as_deref()),
            fuel_type: parse_fuel_type(&mut errors, self.fuel_type.as_deref()),
            status: parse_status(&mut errors, self.status.as_deref()),
            featured: parse_field(&mut errors, "featured", featured.as_deref(), "Featured must be true or false"),
            year_min: parse_field(&mut errors, "yearMin", self.year_min.as_deref(), "yearMin must be a whole number"),
            year_max: parse_field(&mut errors, "yearMax", self.year_max.as_deref(), "yearMax must be a whole number"),
            price_min: parse_field(&mut errors, "priceMin", self.price_min.as_deref(), "priceMin must be a number"),
            price_max: parse_field(&mut errors, "priceMax", self.price_max.as_deref(), "priceMax must be a number"),
        };
        let page = parse_field(&mut errors, "page", self.page.as_deref(), "Page must be a whole number");
        let limit = parse_field(&mut errors, "limit", self.limit.as_deref(), "Limit must be a whole number");

        into_result(errors)?;

        Ok(VehicleQuery {
            filter,
            sort: VehicleSort::from_param(self.sort.as_deref()),
            order: SortOrder::from_param(self.order.as_deref()),
            page: Pagination::new(page, limit, DEFAULT_PAGE_SIZE),
        })
    }
}

// Vehicle detail: the record plus its currently active offers
#[derive(Debug, Serialize)]
pub struct VehicleDetailResponse {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub offers: Vec<Offer>,
}
