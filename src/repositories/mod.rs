//! Repositories
//!
//! One async trait per entity, each with a Postgres implementation and a
//! shared in-memory implementation (`MemoryStore`).

pub mod inquiry_repository;
pub mod memory;
pub mod offer_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use inquiry_repository::{InquiryRepository, PgInquiryRepository};
pub use memory::MemoryStore;
pub use offer_repository::{OfferRepository, PgOfferRepository};
pub use user_repository::{PgUserRepository, RoleResolver, UserRepository};
pub use vehicle_repository::{PgVehicleRepository, VehicleRepository};
