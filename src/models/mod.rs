//! Data models
//!
//! This module contains the records stored in PostgreSQL and the typed
//! values the repositories accept.

pub mod inquiry;
pub mod offer;
pub mod pagination;
pub mod user;
pub mod vehicle;
