//! Shared utilities
//!
//! Error handling, validation, JWT, password hashing and lenient
//! deserialization helpers.

pub mod errors;
pub mod jwt;
pub mod password;
pub mod serde_helpers;
pub mod validation;
