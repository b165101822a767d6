//! Domain operations
//!
//! One controller per entity, built from `AppState` per request. Route
//! handlers extract and gate the caller; controllers validate input and
//! talk to the repositories.

pub mod auth_controller;
pub mod inquiry_controller;
pub mod offer_controller;
pub mod user_controller;
pub mod vehicle_controller;
