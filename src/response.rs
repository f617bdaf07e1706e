use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Standard API response wrapper.
///
/// All Bijou endpoints return this format:
/// ```json
/// {
///   "code": 200,
///   "message": "ok",
///   "data": { ... }
/// }
/// ```
/// `code` always mirrors the HTTP status; `data` is omitted when there is
/// nothing to carry.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a 200 response with a message and data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a 201 response with a message and data.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            code: StatusCode::CREATED.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Create a 200 response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
        }
    }

    /// Create an error response for the given status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}
