//! Vehicle model
//!
//! This module contains the `Vehicle` record, its enums, and the typed
//! search filter / sort used by the catalog listing. Each filter field maps
//! to exactly one predicate; sort columns come from `VehicleSort`, never
//! from request text.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::pagination::Pagination;

/// Gearbox - maps to the `transmission` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "transmission")]
pub enum Transmission {
    #[default]
    Automatic,
    Manual,
}

impl FromStr for Transmission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "automatic" => Ok(Transmission::Automatic),
            "manual" => Ok(Transmission::Manual),
            _ => Err(()),
        }
    }
}

/// Fuel - maps to the `fuel_type` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "fuel_type")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Hybrid,
    Electric,
}

impl FromStr for FuelType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "petrol" => Ok(FuelType::Petrol),
            "diesel" => Ok(FuelType::Diesel),
            "hybrid" => Ok(FuelType::Hybrid),
            "electric" => Ok(FuelType::Electric),
            _ => Err(()),
        }
    }
}

/// Sale status - maps to the `vehicle_status` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl FromStr for VehicleStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "available" => Ok(VehicleStatus::Available),
            "reserved" => Ok(VehicleStatus::Reserved),
            "sold" => Ok(VehicleStatus::Sold),
            _ => Err(()),
        }
    }
}

/// One stored image. `storage_key` names the file under the upload root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleImage {
    pub url: String,
    pub storage_key: String,
}

/// Vehicle listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub mileage: Option<i32>,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub engine_size: Option<String>,
    pub color: Option<String>,
    pub body_type: Option<String>,
    pub description: Option<String>,
    pub images: Vec<VehicleImage>,
    pub status: VehicleStatus,
    pub featured: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable vehicle fields, already validated. Used for create and for the
/// merged record of an update; `images` and `views` are not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleFields {
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub mileage: Option<i32>,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub engine_size: Option<String>,
    pub color: Option<String>,
    pub body_type: Option<String>,
    pub description: Option<String>,
    pub status: VehicleStatus,
    pub featured: bool,
}

impl From<&Vehicle> for VehicleFields {
    fn from(v: &Vehicle) -> Self {
        Self {
            title: v.title.clone(),
            make: v.make.clone(),
            model: v.model.clone(),
            year: v.year,
            price: v.price,
            mileage: v.mileage,
            transmission: v.transmission,
            fuel_type: v.fuel_type,
            engine_size: v.engine_size.clone(),
            color: v.color.clone(),
            body_type: v.body_type.clone(),
            description: v.description.clone(),
            status: v.status,
            featured: v.featured,
        }
    }
}

/// "`year` `make` `model`"
pub fn default_title(year: i32, make: &str, model: &str) -> String {
    format!("{} {} {}", year, make.trim(), model.trim())
}

/// Catalog search filter. All fields are optional and combined with AND;
/// `search` matches title, make or model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFilter {
    pub search: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub transmission: Option<Transmission>,
    pub fuel_type: Option<FuelType>,
    pub status: Option<VehicleStatus>,
    pub featured: Option<bool>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl VehicleFilter {
    /// In-process evaluation, equivalent to the SQL the Postgres
    /// repository builds.
    pub fn matches(&self, v: &Vehicle) -> bool {
        if let Some(search) = &self.search {
            if !(contains_ci(&v.title, search) || contains_ci(&v.make, search) || contains_ci(&v.model, search)) {
                return false;
            }
        }
        if let Some(make) = &self.make {
            if !contains_ci(&v.make, make) {
                return false;
            }
        }
        if let Some(model) = &self.model {
            if !contains_ci(&v.model, model) {
                return false;
            }
        }
        if self.transmission.map_or(false, |t| t != v.transmission)
            || self.fuel_type.map_or(false, |f| f != v.fuel_type)
            || self.status.map_or(false, |s| s != v.status)
            || self.featured.map_or(false, |f| f != v.featured)
        {
            return false;
        }
        if self.year_min.map_or(false, |min| v.year < min) || self.year_max.map_or(false, |max| v.year > max) {
            return false;
        }
        if self.price_min.map_or(false, |min| v.price < min) || self.price_max.map_or(false, |max| v.price > max) {
            return false;
        }
        true
    }
}

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VehicleSort {
    #[default]
    CreatedAt,
    Price,
    Year,
    Mileage,
    Views,
}

impl VehicleSort {
    /// Unknown values fall back to `CreatedAt`
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price") => VehicleSort::Price,
            Some("year") => VehicleSort::Year,
            Some("mileage") => VehicleSort::Mileage,
            Some("views") => VehicleSort::Views,
            _ => VehicleSort::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            VehicleSort::CreatedAt => "created_at",
            VehicleSort::Price => "price",
            VehicleSort::Year => "year",
            VehicleSort::Mileage => "mileage",
            VehicleSort::Views => "views",
        }
    }

    /// Ascending comparison. A missing mileage sorts after every value,
    /// as NULL does in Postgres.
    pub fn compare(&self, a: &Vehicle, b: &Vehicle) -> Ordering {
        match self {
            VehicleSort::CreatedAt => a.created_at.cmp(&b.created_at),
            VehicleSort::Price => a.price.cmp(&b.price),
            VehicleSort::Year => a.year.cmp(&b.year),
            VehicleSort::Mileage => match (a.mileage, b.mileage) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            VehicleSort::Views => a.views.cmp(&b.views),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// A parsed catalog listing request
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleQuery {
    pub filter: VehicleFilter,
    pub sort: VehicleSort,
    pub order: SortOrder,
    pub page: Pagination,
}

/// Catalog counters
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VehicleStats {
    pub total: i64,
    pub available: i64,
    pub reserved: i64,
    pub sold: i64,
    pub makes: Vec<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn vehicle(make: &str, model: &str, year: i32, price: i64) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: Uuid::new_v4(),
            title: default_title(year, make, model),
            make: make.into(),
            model: model.into(),
            year,
            price: Decimal::from(price),
            mileage: None,
            transmission: Transmission::default(),
            fuel_type: FuelType::default(),
            engine_size: None,
            color: None,
            body_type: None,
            description: None,
            images: Vec::new(),
            status: VehicleStatus::default(),
            featured: false,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_make_filter_is_case_insensitive_substring() {
        let hilux = vehicle("Toyota", "Hilux", 2021, 4_800_000);
        let filter = VehicleFilter {
            make: Some("toy".into()),
            ..Default::default()
        };
        assert!(filter.matches(&hilux));

        let filter = VehicleFilter {
            make: Some("nissan".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&hilux));
    }

    #[test]
    fn test_search_covers_title_make_and_model() {
        let hilux = vehicle("Toyota", "Hilux", 2021, 4_800_000);
        for term in ["HILUX", "toyota", "2021 toy"] {
            let filter = VehicleFilter {
                search: Some(term.into()),
                ..Default::default()
            };
            assert!(filter.matches(&hilux), "search '{}' should match", term);
        }
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let car = vehicle("Mazda", "CX-5", 2019, 3_000_000);
        let exact = VehicleFilter {
            price_min: Some(Decimal::from(3_000_000)),
            price_max: Some(Decimal::from(3_000_000)),
            ..Default::default()
        };
        assert!(exact.matches(&car));

        let open_max = VehicleFilter {
            price_min: Some(Decimal::from(2_000_000)),
            ..Default::default()
        };
        assert!(open_max.matches(&car));

        let above = VehicleFilter {
            price_min: Some(Decimal::from(3_000_001)),
            ..Default::default()
        };
        assert!(!above.matches(&car));
    }

    #[test]
    fn test_enum_and_flag_filters() {
        let mut car = vehicle("Honda", "Fit", 2015, 900_000);
        car.featured = true;
        car.fuel_type = FuelType::Hybrid;

        let filter = VehicleFilter {
            featured: Some(true),
            fuel_type: Some(FuelType::Hybrid),
            status: Some(VehicleStatus::Available),
            ..Default::default()
        };
        assert!(filter.matches(&car));

        let filter = VehicleFilter {
            transmission: Some(Transmission::Manual),
            ..Default::default()
        };
        assert!(!filter.matches(&car));
    }

    #[test]
    fn test_sort_param_fallback() {
        assert_eq!(VehicleSort::from_param(Some("price")), VehicleSort::Price);
        assert_eq!(VehicleSort::from_param(Some("password")), VehicleSort::CreatedAt);
        assert_eq!(VehicleSort::from_param(None), VehicleSort::CreatedAt);
        assert_eq!(SortOrder::from_param(Some("AsC")), SortOrder::Asc);
        assert_eq!(SortOrder::from_param(Some("sideways")), SortOrder::Desc);
    }

    #[test]
    fn test_missing_mileage_sorts_last_ascending() {
        let mut a = vehicle("A", "A", 2020, 1);
        a.mileage = Some(10);
        let b = vehicle("B", "B", 2020, 1);
        assert_eq!(VehicleSort::Mileage.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("manual".parse::<Transmission>(), Ok(Transmission::Manual));
        assert_eq!("Electric".parse::<FuelType>(), Ok(FuelType::Electric));
        assert_eq!("SOLD".parse::<VehicleStatus>(), Ok(VehicleStatus::Sold));
        assert!("steam".parse::<FuelType>().is_err());
    }

    #[test]
    fn test_price_serializes_as_number() {
        let car = vehicle("Toyota", "Hilux", 2021, 4_800_000);
        let json = serde_json::to_value(&car).unwrap();
        assert_eq!(json["price"], serde_json::json!(4800000.0));
        assert_eq!(json["fuelType"], "Petrol");
        assert_eq!(json["status"], "available");
        assert_eq!(json["title"], "2021 Toyota Hilux");
    }
}
