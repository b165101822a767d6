//! Password hashing
//!
//! Hashing is an explicit step at the write boundary of the user
//! operations; nothing hashes implicitly on save. bcrypt is CPU bound, so
//! every call runs on the blocking pool.

use bcrypt::{hash, verify};
use std::sync::OnceLock;

use crate::utils::errors::AppError;

/// Hash compared against when a login names an unknown email
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))
}

/// Run a full bcrypt verification against a fixed hash of the configured
/// cost, so unknown emails take as long to reject as known ones.
/// Always `false`.
pub async fn verify_against_dummy(password: &str, cost: u32) -> bool {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let dummy = DUMMY_HASH.get_or_init(|| hash("dummy-password-for-timing", cost).ok());
        if let Some(dummy) = dummy {
            let _ = verify(password, dummy);
        }
        false
    })
    .await
    .unwrap_or(false)
}
