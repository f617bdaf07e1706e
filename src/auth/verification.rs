use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::config::Config;
use crate::db::is_unique_violation;
use crate::error::ApiError;
use crate::models::email_verification;

/// How many fresh codes to try before conceding the code space is saturated.
const CODE_ALLOC_ATTEMPTS: usize = 8;

/// A freshly issued verification code, ready to be emailed.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: NaiveDateTime,
}

/// Generate a uniform 4-digit verification code (1000..=9999).
fn generate_code() -> String {
    rand::thread_rng().gen_range(1000..10000).to_string()
}

/// Issue the single live verification code for a user.
///
/// Upsert keyed on the unique `user_id`: a fresh registration inserts, a
/// re-issue replaces the existing row in place and bumps `resend_count`.
/// The `code` column is globally unique; when a freshly drawn code collides
/// with another user's live code the insert fails and a new code is drawn,
/// a bounded number of times.
pub async fn issue_code(
    db: &DatabaseConnection,
    user_id: Uuid,
    config: &Config,
) -> Result<IssuedCode, ApiError> {
    let now = Utc::now().naive_utc();
    let expires_at = now + Duration::seconds(config.verification_code_ttl_secs);

    for _ in 0..CODE_ALLOC_ATTEMPTS {
        let code = generate_code();

        let model = email_verification::ActiveModel {
            user_id: Set(user_id),
            code: Set(code.clone()),
            resend_count: Set(0),
            expires_at: Set(expires_at),
            created_at: Set(now),
            ..Default::default()
        };

        let result = email_verification::Entity::insert(model)
            .on_conflict(
                OnConflict::column(email_verification::Column::UserId)
                    .update_columns([
                        email_verification::Column::Code,
                        email_verification::Column::ExpiresAt,
                    ])
                    .value(
                        email_verification::Column::ResendCount,
                        Expr::col(email_verification::Column::ResendCount).add(1),
                    )
                    .to_owned(),
            )
            .exec(db)
            .await;

        match result {
            Ok(_) => return Ok(IssuedCode { code, expires_at }),
            Err(err) if is_unique_violation(&err) => continue,
            Err(err) => return Err(err.into()),
        }
    }

    Err(ApiError::Internal(
        "could not allocate a unique verification code".to_string(),
    ))
}

/// Re-issue a code for a user whose previous code expired, honoring the
/// configured resend limit.
pub async fn reissue_code(
    db: &DatabaseConnection,
    existing: &email_verification::Model,
    config: &Config,
) -> Result<IssuedCode, ApiError> {
    if let Some(limit) = config.verification_resend_limit {
        if existing.resend_count >= limit as i32 {
            return Err(ApiError::TooManyRequests(
                "verification resend limit reached".to_string(),
            ));
        }
    }

    issue_code(db, existing.user_id, config).await
}

/// Find a pending verification by its code.
pub async fn find_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<email_verification::Model>, ApiError> {
    let found = email_verification::Entity::find()
        .filter(email_verification::Column::Code.eq(code))
        .one(db)
        .await?;
    Ok(found)
}

/// Remove any pending verification rows for a user.
pub async fn delete_for_user(db: &DatabaseConnection, user_id: Uuid) -> Result<(), ApiError> {
    email_verification::Entity::delete_many()
        .filter(email_verification::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}
