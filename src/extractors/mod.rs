pub mod auth_user;
pub mod json;

pub use auth_user::{AdminUser, AuthUser};
pub use json::Json;
