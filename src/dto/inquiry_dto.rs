use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::models::inquiry::{InquiryStatus, NewInquiry};
use crate::models::pagination::Pagination;
use crate::utils::errors::{field_error, into_result, AppError, AppResult};
use crate::utils::validation::{derive_errors, non_blank, parse_field, parse_id, require};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

pub const THANK_YOU_MESSAGE: &str = "Thank you for your inquiry. We will contact you shortly.";

// Contact form submission
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    pub email: Option<String>,

    #[validate(length(max = 20, message = "Phone number must be at most 20 characters"))]
    pub phone: Option<String>,

    pub message: Option<String>,

    pub vehicle_id: Option<String>,
}

impl CreateInquiryRequest {
    pub fn into_new_inquiry(self) -> AppResult<NewInquiry> {
        let mut errors = derive_errors(&self);

        let name = require(&mut errors, "name", non_blank(self.name), "Name is required");
        let phone = require(&mut errors, "phone", non_blank(self.phone), "Phone number is required");
        let message = require(&mut errors, "message", non_blank(self.message), "Message is required");
        let email = non_blank(self.email);
        if let Some(email) = &email {
            if !validator::validate_email(email.as_str()) {
                errors.add("email", field_error("email", "Please provide a valid email"));
            }
        }

        into_result(errors)?;

        // an id that cannot parse cannot reference a vehicle
        let vehicle_id = match non_blank(self.vehicle_id) {
            Some(raw) => Some(parse_id(&raw, "Vehicle")?),
            None => None,
        };

        match (name, phone, message) {
            (Some(name), Some(phone), Some(message)) => Ok(NewInquiry {
                name,
                email: email.map(|e| e.to_lowercase()),
                phone,
                message,
                vehicle_id,
            }),
            _ => Err(AppError::Internal("inquiry fields missing after validation".to_string())),
        }
    }
}

// Status transition by staff
#[derive(Debug, Deserialize)]
pub struct UpdateInquiryRequest {
    pub status: Option<String>,
}

impl UpdateInquiryRequest {
    pub fn into_status(self) -> AppResult<InquiryStatus> {
        let mut errors = ValidationErrors::new();
        let raw = require(&mut errors, "status", non_blank(self.status), "Status is required");
        let status = parse_field(&mut errors, "status", raw.as_deref(), "Status must be new, contacted or closed");
        into_result(errors)?;
        status.ok_or_else(|| AppError::Internal("status missing after validation".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InquiryListQuery {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InquiryListParams {
    pub status: Option<InquiryStatus>,
    pub page: Pagination,
}

impl InquiryListQuery {
    pub fn into_params(self) -> AppResult<InquiryListParams> {
        let mut errors = ValidationErrors::new();
        let status = parse_field(&mut errors, "status", self.status.as_deref(), "Status must be new, contacted or closed");
        let page = parse_field(&mut errors, "page", self.page.as_deref(), "Page must be a whole number");
        let limit = parse_field(&mut errors, "limit", self.limit.as_deref(), "Limit must be a whole number");
        into_result(errors)?;

        Ok(InquiryListParams {
            status,
            page: Pagination::new(page, limit, DEFAULT_PAGE_SIZE),
        })
    }
}
