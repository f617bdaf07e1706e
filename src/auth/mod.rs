pub mod jwt;
pub mod password;
pub mod verification;

pub use jwt::{
    create_access_token, create_refresh_token, validate_access_token, validate_refresh_token,
    Claims,
};
pub use password::{hash_password, password_meets_policy, username_is_valid, verify_password};
