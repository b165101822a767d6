//! Validation helpers
//!
//! Field checks that the `validator` derive cannot express on its own
//! (bounds that depend on the current date, decimal ranges, ISO 8601
//! parsing) plus the parsing used for path ids.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::utils::errors::{field_error, not_found_error, AppResult};

pub const MIN_MODEL_YEAR: i32 = 1900;

/// Exclusive upper bound of a NUMERIC(12,2) money column
pub const MAX_AMOUNT: i64 = 10_000_000_000;

/// Newest accepted model year: next calendar year.
pub fn max_model_year() -> i32 {
    Utc::now().year() + 1
}

/// Model year must be within 1900..=current year + 1
pub fn validate_model_year(year: i32) -> Result<(), ValidationError> {
    let max = max_model_year();
    if year < MIN_MODEL_YEAR || year > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &MIN_MODEL_YEAR);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &year);
        error.message = Some(format!("Year must be between {} and {}", MIN_MODEL_YEAR, max).into());
        return Err(error);
    }
    Ok(())
}

/// Value must be zero or greater
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Record `message` against `field` when a present value is negative
pub fn check_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<T>,
    message: &'static str,
) {
    if let Some(Err(mut error)) = value.map(validate_non_negative) {
        error.message = Some(message.into());
        errors.add(field, error);
    }
}

/// Money must be non-negative and fit its column
pub fn check_amount(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<Decimal>,
    negative: &'static str,
    too_large: &'static str,
) {
    match value {
        Some(amount) if amount >= Decimal::from(MAX_AMOUNT) => errors.add(field, field_error("range", too_large)),
        _ => check_non_negative(errors, field, value, negative),
    }
}

/// Parse an ISO 8601 value: a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date (midnight UTC).
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a path id. A malformed id cannot match any record, so it is
/// reported as the resource not being found.
pub fn parse_id(value: &str, resource: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| not_found_error(resource))
}

/// Start from the derive's errors so manual checks add to the same list
pub fn derive_errors<T: validator::Validate>(value: &T) -> ValidationErrors {
    value.validate().err().unwrap_or_else(ValidationErrors::new)
}

/// Record a `required` error when `value` is missing
pub fn require<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<T>,
    message: &'static str,
) -> Option<T> {
    if value.is_none() {
        errors.add(field, field_error("required", message));
    }
    value
}

/// Parse an optional enum-like value, recording an error when it does not parse
pub fn parse_field<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    message: &'static str,
) -> Option<T> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(field, field_error("invalid", message));
            None
        }
    }
}

/// Treat `Some("")` / whitespace as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
