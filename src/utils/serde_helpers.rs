//! Lenient deserializers for form-style JSON
//!
//! The admin console posts numeric inputs as strings and sends `""` for
//! untouched optional fields. These helpers accept a number, a numeric
//! string, `""` or `null`.

use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// `Option<T>` from a number, numeric string, empty string or null
pub fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse::<T>().map(Some).map_err(de::Error::custom)
            }
        }
    }
}

/// Partial-update form of `optional_number`; use with `#[serde(default)]`.
/// Absent is `None`, `null` or `""` is `Some(None)`.
pub fn nullable_number<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    optional_number(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "optional_number")]
        year: Option<i32>,
        #[serde(default, deserialize_with = "optional_number")]
        price: Option<Decimal>,
        #[serde(default, deserialize_with = "nullable_number")]
        mileage: Option<Option<i32>>,
    }

    #[test]
    fn test_numbers_and_strings() {
        let form: Form = serde_json::from_str(r#"{"year": 2021, "price": "4800000.50"}"#).unwrap();
        assert_eq!(form.year, Some(2021));
        assert_eq!(form.price, Some(Decimal::new(480000050, 2)));
        assert_eq!(form.mileage, None);

        let form: Form = serde_json::from_str(r#"{"year": "2019", "price": 12.5}"#).unwrap();
        assert_eq!(form.year, Some(2019));
        assert_eq!(form.price, Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_empty_values_are_none() {
        let form: Form = serde_json::from_str(r#"{"year": "", "price": null}"#).unwrap();
        assert_eq!(form.year, None);
        assert_eq!(form.price, None);
    }

    #[test]
    fn test_nullable_number_distinguishes_cleared_from_absent() {
        let form: Form = serde_json::from_str(r#"{"mileage": null}"#).unwrap();
        assert_eq!(form.mileage, Some(None));
        let form: Form = serde_json::from_str(r#"{"mileage": " "}"#).unwrap();
        assert_eq!(form.mileage, Some(None));
        let form: Form = serde_json::from_str(r#"{"mileage": "42000"}"#).unwrap();
        assert_eq!(form.mileage, Some(Some(42_000)));
        let form: Form = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(form.mileage, None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(serde_json::from_str::<Form>(r#"{"year": "abc"}"#).is_err());
    }
}
