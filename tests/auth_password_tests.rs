use bijou::auth::{hash_password, password_meets_policy, username_is_valid, verify_password};

// ═══ Hashing ═══

#[tokio::test]
async fn test_hash_and_verify_password() {
    let password = "Sup3r$ecret";
    let hash = hash_password(password).await.expect("Failed to hash password");

    assert!(!hash.is_empty());
    assert_ne!(hash, password);
    assert!(hash.starts_with("$argon2"));

    let is_valid = verify_password(password, &hash)
        .await
        .expect("Failed to verify password");
    assert!(is_valid);
}

#[tokio::test]
async fn test_wrong_password_fails() {
    let hash = hash_password("Corr3ct!pass").await.expect("Failed to hash");

    let is_valid = verify_password("Wr0ng!pass", &hash)
        .await
        .expect("Failed to verify");
    assert!(!is_valid);
}

#[tokio::test]
async fn test_case_sensitive_passwords() {
    let hash = hash_password("Password123!").await.expect("Failed to hash");

    assert!(verify_password("Password123!", &hash)
        .await
        .expect("Failed to verify"));
    assert!(!verify_password("password123!", &hash)
        .await
        .expect("Failed to verify"));
}

#[tokio::test]
async fn test_same_password_different_hashes() {
    let password = "Sup3r$ecret";
    let first = hash_password(password).await.expect("Failed to hash");
    let second = hash_password(password).await.expect("Failed to hash");

    // Random salt per hash
    assert_ne!(first, second);
    assert!(verify_password(password, &first).await.expect("Failed to verify"));
    assert!(verify_password(password, &second).await.expect("Failed to verify"));
}

#[tokio::test]
async fn test_verify_garbage_hash_is_error() {
    let result = verify_password("whatever", "not-a-phc-string").await;
    assert!(result.is_err());
}

// ═══ Password policy ═══

#[test]
fn test_policy_accepts_strong_password() {
    assert!(password_meets_policy("Sup3r$ecret"));
    assert!(password_meets_policy("Aa1!aaaa"));
}

#[test]
fn test_policy_rejects_short_password() {
    assert!(!password_meets_policy("Aa1!aaa"));
}

#[test]
fn test_policy_rejects_missing_classes() {
    assert!(!password_meets_policy("alllowercase1!"));
    assert!(!password_meets_policy("ALLUPPERCASE1!"));
    assert!(!password_meets_policy("NoDigitsHere!"));
    assert!(!password_meets_policy("NoSymbols123"));
}

#[test]
fn test_policy_rejects_empty() {
    assert!(!password_meets_policy(""));
}

// ═══ Username policy ═══

#[test]
fn test_username_valid() {
    assert!(username_is_valid("bob"));
    assert!(username_is_valid("alice99"));
    assert!(username_is_valid("X1Y2Z3"));
}

#[test]
fn test_username_too_short() {
    assert!(!username_is_valid(""));
    assert!(!username_is_valid("ab"));
}

#[test]
fn test_username_rejects_symbols_and_spaces() {
    assert!(!username_is_valid("bob smith"));
    assert!(!username_is_valid("bob!"));
    assert!(!username_is_valid("bob-smith"));
    assert!(!username_is_valid("böb"));
}
