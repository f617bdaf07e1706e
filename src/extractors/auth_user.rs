use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{self, Claims};
use crate::config::Config;
use crate::error::ApiError;

/// Extractor that validates the Bearer access token and provides the
/// caller's claims.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
///     // claims.sub is the authenticated user's UUID
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing authorization token".to_string()))?;

        // Expect "Bearer <token>"
        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("invalid authorization header format".to_string())
        })?;

        // Arc<Config> is installed as a request extension by the router
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .ok_or_else(|| ApiError::Internal("Config not found in request".to_string()))?;

        let claims = auth::validate_access_token(token, config)?;

        Ok(AuthUser(claims))
    }
}

/// Extractor that additionally requires the admin role.
///
/// The role comes from the validated claims; there is no second lookup.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.role.is_admin() {
            return Err(ApiError::Forbidden("admin role required".to_string()));
        }

        Ok(AdminUser(claims))
    }
}
