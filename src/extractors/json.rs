use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON extractor whose rejection speaks the API's envelope.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn login(Json(payload): Json<LoginRequest>) -> impl IntoResponse {
///     // payload is deserialized from the request body
/// }
/// ```
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| ApiError::Validation(format!("failed to read body: {}", e)))?;

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Validation(format!("invalid JSON: {}", e)))?;

        Ok(Json(value))
    }
}
