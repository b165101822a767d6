//! Dealership inventory and lead-capture API
//!
//! Public catalog (vehicles, offers, contact form) plus the back office
//! used by staff and admins.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
