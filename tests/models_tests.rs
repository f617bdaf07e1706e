use bijou::models::user::{self, Role, UserResponse};
use chrono::Utc;
use uuid::Uuid;

fn sample_user() -> user::Model {
    let now = Utc::now().naive_utc();
    user::Model {
        id: Uuid::new_v4(),
        fullname: "Grace Hopper".to_string(),
        username: "graceh".to_string(),
        email: "grace@example.com".to_string(),
        password_hash: "$argon2id$secret".to_string(),
        role: Role::Admin,
        verified: true,
        avatar_url: "http://localhost:3000/images/users/default.png".to_string(),
        refresh_token: Some("live-refresh-token".to_string()),
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

// ═══ Role ═══

#[test]
fn test_role_as_str() {
    assert_eq!(Role::Member.as_str(), "member");
    assert_eq!(Role::Admin.as_str(), "admin");
}

#[test]
fn test_role_is_admin() {
    assert!(Role::Admin.is_admin());
    assert!(!Role::Member.is_admin());
}

#[test]
fn test_role_serde_lowercase() {
    assert_eq!(serde_json::to_value(Role::Member).unwrap(), "member");
    assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");

    let role: Role = serde_json::from_value(serde_json::json!("admin")).unwrap();
    assert_eq!(role, Role::Admin);
}

#[test]
fn test_role_rejects_unknown_value() {
    let result: Result<Role, _> = serde_json::from_value(serde_json::json!("owner"));
    assert!(result.is_err());
}

// ═══ User serialization ═══

#[test]
fn test_user_model_hides_credentials() {
    let json = serde_json::to_value(sample_user()).expect("Failed to serialize");

    assert!(json.get("password_hash").is_none());
    assert!(json.get("refresh_token").is_none());
    assert!(json.get("deleted_at").is_none());
    assert_eq!(json["username"], "graceh");
}

#[test]
fn test_user_response_from_model() {
    let user = sample_user();
    let id = user.id;

    let response = UserResponse::from(user);

    assert_eq!(response.id, id);
    assert_eq!(response.fullname, "Grace Hopper");
    assert_eq!(response.role, Role::Admin);
    assert!(response.verified);

    let json = serde_json::to_value(&response).expect("Failed to serialize");
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["role"], "admin");
}
