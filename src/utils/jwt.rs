//! JWT utilities
//!
//! Session tokens are HS256 JWTs carrying the user id. They are stateless:
//! a token stays valid until it expires.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::environment::EnvironmentConfig,
    models::user::UserRole,
    utils::errors::AppError,
};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,  // user_id
    pub role: String, // role at issue time, informational only
    pub exp: usize,   // expiration timestamp
    pub iat: usize,   // issued at timestamp
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Issue a token for a user
pub fn generate_token(user_id: Uuid, role: UserRole, config: &JwtConfig) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.expiration as i64);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode_claims(&claims, config)
}

fn encode_claims(claims: &JwtClaims, config: &JwtConfig) -> Result<String, AppError> {
    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Error generating token: {}", e)))
}

/// Verify a token and return its claims
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

    Ok(token_data.claims)
}

/// Verified user id from a token
pub fn user_id_from_token(token: &str, config: &JwtConfig) -> Result<Uuid, AppError> {
    let claims = verify_token(token, config)?;
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)
}

/// Extract the token from an `Authorization` header value
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::NotAuthorized("Not authorized to access this route".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::NotAuthorized("Not authorized to access this route".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        }
    }

    #[test]
    fn test_generate_and_verify_token() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, UserRole::Staff, &config()).unwrap();

        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "staff");
        assert_eq!(user_id_from_token(&token, &config()).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token() {
        let past = (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize;
        let claims = JwtClaims {
            sub: Uuid::new_v4().to_string(),
            role: "admin".to_string(),
            exp: past,
            iat: past - 60,
        };
        let token = encode_claims(&claims, &config()).unwrap();

        assert!(matches!(verify_token(&token, &config()), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = generate_token(Uuid::new_v4(), UserRole::Admin, &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            expiration: 3600,
        };
        assert!(matches!(verify_token(&token, &other), Err(AppError::InvalidToken)));
        assert!(matches!(verify_token("garbage", &config()), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Basic abc").is_err());
        assert!(extract_token_from_header("Bearer ").is_err());
    }
}
