//! Environment configuration
//!
//! Every setting comes from an environment variable (optionally loaded from
//! `.env` by `dotenvy`). Missing optional values fall back to defaults;
//! malformed values are reported as errors instead of panicking.

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEV_JWT_SECRET: &str = "dev-only-secret-change-me";

/// Environments allowed to run on `DEV_JWT_SECRET`
const DEV_ENVIRONMENTS: &[&str] = &["development", "test"];

/// Application configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub bcrypt_cost: u32,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub reconcile_uploads_on_start: bool,
}

/// Admin account created at startup when no admin exists yet
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl EnvironmentConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let port: u16 = parse_var("PORT", 5000)?;

        let jwt_secret = resolve_jwt_secret(&environment, env::var("JWT_SECRET").ok())?;

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 20)?,
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", 7 * 24 * 3600)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bootstrap_admin,
            reconcile_uploads_on_start: parse_var("RECONCILE_UPLOADS_ON_START", false)?,
            environment,
        })
    }

    /// Configuration for local runs and tests: no database, cheap hashing.
    pub fn local(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: None,
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration: 3600,
            cors_origins: Vec::new(),
            upload_dir: upload_dir.into(),
            public_base_url: "http://localhost:5000".to_string(),
            bcrypt_cost: 4,
            bootstrap_admin: None,
            reconcile_uploads_on_start: false,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got '{}'", name, raw)),
        _ => Ok(default),
    }
}

fn resolve_jwt_secret(environment: &str, secret: Option<String>) -> Result<String> {
    match secret {
        Some(secret) if !secret.trim().is_empty() => Ok(secret),
        _ if DEV_ENVIRONMENTS.contains(&environment) => {
            tracing::warn!("⚠️ JWT_SECRET not set, using the development secret");
            Ok(DEV_JWT_SECRET.to_string())
        }
        _ => bail!("JWT_SECRET must be set when ENVIRONMENT is '{}'", environment),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
