use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::mailer::Mailer;
use crate::storage::StorageBackend;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
    pub storage: Arc<dyn StorageBackend>,
}

pub mod auth;
pub mod genres;
pub mod movies;
pub mod users;
