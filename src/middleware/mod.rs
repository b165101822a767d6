//! Middleware
//!
//! Authentication extractors, the role gate and CORS.

pub mod auth;
pub mod cors;

pub use auth::*;
pub use cors::*;
