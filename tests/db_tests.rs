mod common;

use bijou::db::is_unique_violation;
use bijou::models::genre;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DbErr, Set};

fn genre_row(name: &str) -> genre::ActiveModel {
    let now = Utc::now().naive_utc();
    genre::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_migrations_apply_cleanly() {
    let db = common::test_db().await;

    genre_row("Smoke Test")
        .insert(&db)
        .await
        .expect("Failed to insert into migrated schema");
}

#[tokio::test]
async fn test_unique_violation_detected() {
    let db = common::test_db().await;

    genre_row("Duplicate").insert(&db).await.expect("Failed to insert");
    let err = genre_row("Duplicate")
        .insert(&db)
        .await
        .expect_err("Expected a unique violation");

    assert!(is_unique_violation(&err));
}

#[test]
fn test_other_errors_are_not_unique_violations() {
    let err = DbErr::Custom("connection lost".to_string());
    assert!(!is_unique_violation(&err));
}
