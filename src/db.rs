use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;

use crate::config::Config;

/// Whether a database error is a unique-constraint violation.
///
/// Used to turn races on unique columns (email, username, genre name,
/// verification code) into client errors instead of 500s.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Initialize the database connection from config.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut opts = ConnectOptions::new(&config.database_url);
    opts.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(config.is_dev());

    let db = SeaDatabase::connect(opts).await?;
    tracing::debug!(url = %config.database_url, "database connected");
    Ok(db)
}
