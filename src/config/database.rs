//! Database configuration
//!
//! Pool settings for PostgreSQL, derived from `EnvironmentConfig`.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::environment::EnvironmentConfig;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    /// Fails when `DATABASE_URL` was not configured
    pub fn from_config(config: &EnvironmentConfig) -> Result<Self> {
        let url = config
            .database_url
            .clone()
            .context("DATABASE_URL must be set in environment variables")?;

        Ok(Self {
            url,
            max_connections: config.db_max_connections,
            min_connections: config.db_max_connections.min(5),
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        })
    }

    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_database_url() {
        let mut config = EnvironmentConfig::local("uploads");
        assert!(DatabaseConfig::from_config(&config).is_err());

        config.database_url = Some("postgres://localhost/dealership".into());
        config.db_max_connections = 3;
        let db = DatabaseConfig::from_config(&config).unwrap();
        assert_eq!(db.max_connections, 3);
        assert_eq!(db.min_connections, 3);
    }
}
