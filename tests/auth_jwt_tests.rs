mod common;

use bijou::auth::{
    create_access_token, create_refresh_token, validate_access_token, validate_refresh_token,
};
use bijou::models::user::{self, Role};
use bijou::ApiError;
use chrono::Utc;
use uuid::Uuid;

fn sample_user() -> user::Model {
    let now = Utc::now().naive_utc();
    user::Model {
        id: Uuid::new_v4(),
        fullname: "Ada Lovelace".to_string(),
        username: "ada42".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: "$argon2id$irrelevant".to_string(),
        role: Role::Member,
        verified: true,
        avatar_url: "http://localhost:3000/images/users/default.png".to_string(),
        refresh_token: None,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

// ═══ Access tokens ═══

#[test]
fn test_access_token_roundtrip() {
    let config = common::test_config();
    let user = sample_user();

    let token = create_access_token(&user, &config).expect("Failed to create access token");
    let claims = validate_access_token(&token, &config).expect("Failed to validate access token");

    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.fullname, user.fullname);
    assert_eq!(claims.username, user.username);
    assert_eq!(claims.email, user.email);
    assert_eq!(claims.role, Role::Member);
    assert_eq!(claims.avatar_url, user.avatar_url);
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_access_token_carries_admin_role() {
    let config = common::test_config();
    let mut user = sample_user();
    user.role = Role::Admin;

    let token = create_access_token(&user, &config).expect("Failed to create access token");
    let claims = validate_access_token(&token, &config).expect("Failed to validate access token");

    assert_eq!(claims.role, Role::Admin);
    assert!(claims.role.is_admin());
}

#[test]
fn test_tampered_token_rejected() {
    let config = common::test_config();
    let token = create_access_token(&sample_user(), &config).expect("Failed to create token");

    let mut tampered = token.clone();
    tampered.pop();
    tampered.push(if token.ends_with('x') { 'y' } else { 'x' });

    let result = validate_access_token(&tampered, &config);
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[test]
fn test_garbage_token_rejected() {
    let config = common::test_config();
    let result = validate_access_token("not.a.jwt", &config);
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[test]
fn test_expired_access_token_rejected() {
    let mut config = common::test_config();
    // Far enough in the past to beat the validator's default leeway
    config.access_token_ttl_secs = -120;

    let token = create_access_token(&sample_user(), &config).expect("Failed to create token");

    let result = validate_access_token(&token, &config);
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

// ═══ Refresh tokens ═══

#[test]
fn test_refresh_token_roundtrip() {
    let config = common::test_config();
    let user = sample_user();

    let token = create_refresh_token(&user, &config).expect("Failed to create refresh token");
    let claims = validate_refresh_token(&token, &config).expect("Failed to validate refresh token");

    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, user.email);
}

#[test]
fn test_token_secrets_are_not_interchangeable() {
    let config = common::test_config();
    let user = sample_user();

    let access = create_access_token(&user, &config).expect("Failed to create access token");
    let refresh = create_refresh_token(&user, &config).expect("Failed to create refresh token");

    assert!(validate_access_token(&refresh, &config).is_err());
    assert!(validate_refresh_token(&access, &config).is_err());
}

#[test]
fn test_token_invalid_under_different_secret() {
    let config = common::test_config();
    let mut other = common::test_config();
    other.access_token_secret = "another-secret-entirely".to_string();

    let token = create_access_token(&sample_user(), &config).expect("Failed to create token");

    assert!(validate_access_token(&token, &other).is_err());
    assert!(validate_access_token(&token, &config).is_ok());
}
