pub mod auth_dto;
pub mod common_dto;
pub mod inquiry_dto;
pub mod offer_dto;
pub mod user_dto;
pub mod vehicle_dto;
