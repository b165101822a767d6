//! Database
//!
//! PostgreSQL pool and migrations

pub mod connection;

pub use connection::DatabaseConnection;
