//! Services
//!
//! Infrastructure used by the controllers that is not a database table.

pub mod image_storage;

pub use image_storage::{ImageStorage, IncomingImage};
