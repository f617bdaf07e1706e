pub mod email_verification;
pub mod genre;
pub mod movie;
pub mod user;
