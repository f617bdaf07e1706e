pub mod app;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod mailer;
pub mod migrations;
pub mod models;
pub mod openapi;
pub mod response;
pub mod storage;

pub use app::{build_router, App};
pub use config::Config;
pub use error::ApiError;
pub use response::ApiResponse;
