use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::user::{self, Role};

/// JWT claims payload. Carries a snapshot of the user's identity so that
/// consumers never need a database round-trip to render who is calling.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Claims {
    /// Subject (user UUID)
    pub sub: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

fn sign(user: &user::Model, secret: &str, ttl_secs: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let expires = now + Duration::seconds(ttl_secs);

    let claims = Claims {
        sub: user.id,
        fullname: user.fullname.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        avatar_url: user.avatar_url.clone(),
        exp: expires.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
}

/// Sign a short-lived access token from the current user record.
pub fn create_access_token(user: &user::Model, config: &Config) -> Result<String, ApiError> {
    sign(user, &config.access_token_secret, config.access_token_ttl_secs)
}

/// Sign a refresh token from the current user record.
pub fn create_refresh_token(user: &user::Model, config: &Config) -> Result<String, ApiError> {
    sign(user, &config.refresh_token_secret, config.refresh_token_ttl_secs)
}

fn validate(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Validate an access token and return its claims.
pub fn validate_access_token(token: &str, config: &Config) -> Result<Claims, ApiError> {
    validate(token, &config.access_token_secret)
        .map_err(|_| ApiError::Forbidden("invalid or expired token".to_string()))
}

/// Validate a refresh token and return its claims.
pub fn validate_refresh_token(token: &str, config: &Config) -> Result<Claims, ApiError> {
    validate(token, &config.refresh_token_secret)
        .map_err(|_| ApiError::Forbidden("invalid refresh token".to_string()))
}
