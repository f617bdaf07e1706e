use axum::body::Bytes;
use bijou::storage::{
    stored_name_from_url, validate_image, FormData, FormFile, LocalStorage, StorageBackend,
    ALLOWED_IMAGE_EXTENSIONS,
};
use bijou::ApiError;

fn image_file(filename: &str, size: usize) -> FormFile {
    FormFile {
        filename: filename.to_string(),
        content_type: "image/png".to_string(),
        data: Bytes::from(vec![0u8; size]),
    }
}

// ═══ validate_image ═══

#[test]
fn test_validate_image_allowed_extensions() {
    for ext in ALLOWED_IMAGE_EXTENSIONS {
        let file = image_file(&format!("photo.{}", ext), 100);
        assert!(validate_image(&file, 1_000_000).is_ok());
    }
}

#[test]
fn test_validate_image_case_insensitive_extension() {
    let file = image_file("photo.PNG", 100);
    assert!(validate_image(&file, 1_000_000).is_ok());
}

#[test]
fn test_validate_image_rejects_unknown_extension() {
    let file = image_file("script.exe", 100);
    let result = validate_image(&file, 1_000_000);
    assert!(matches!(result, Err(ApiError::UnsupportedMedia(_))));
}

#[test]
fn test_validate_image_rejects_no_extension() {
    let file = image_file("README", 100);
    assert!(validate_image(&file, 1_000_000).is_err());
}

#[test]
fn test_validate_image_rejects_oversize() {
    let file = image_file("big.png", 1_000_001);
    let result = validate_image(&file, 1_000_000);
    match result {
        Err(ApiError::UnsupportedMedia(msg)) => {
            assert_eq!(msg, "image must be 1MB or smaller");
        }
        other => panic!("Expected UnsupportedMedia, got {:?}", other),
    }
}

#[test]
fn test_validate_image_accepts_exact_limit() {
    let file = image_file("edge.png", 1_000_000);
    assert!(validate_image(&file, 1_000_000).is_ok());
}

// ═══ stored_name_from_url ═══

#[test]
fn test_stored_name_from_url() {
    let url = "http://localhost:3000/images/posters/abc-123.png";
    assert_eq!(stored_name_from_url(url), Some("abc-123.png"));
}

#[test]
fn test_stored_name_from_url_spares_default() {
    let url = "http://localhost:3000/images/users/default.png";
    assert_eq!(stored_name_from_url(url), None);
}

#[test]
fn test_stored_name_from_url_empty_tail() {
    assert_eq!(stored_name_from_url("http://localhost:3000/images/"), None);
}

// ═══ FormData fields ═══

#[test]
fn test_form_field_trims_and_drops_blank() {
    let mut form = FormData::default();
    form.fields.insert("title".to_string(), "  Dune  ".to_string());
    form.fields.insert("overview".to_string(), "   ".to_string());

    assert_eq!(form.field("title"), Some("Dune"));
    assert_eq!(form.field("overview"), None);
    assert_eq!(form.field("missing"), None);
}

// ═══ LocalStorage ═══

#[tokio::test]
async fn test_local_storage_store() {
    let dir = format!("/tmp/bijou_test_{}", uuid::Uuid::new_v4());
    let storage = LocalStorage::new(&dir, "http://localhost:3000");

    let stored = storage
        .store("users", "me.png", "image/png", b"fake image")
        .await
        .expect("store failed");

    assert_eq!(stored.filename, "me.png");
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(stored.size, 10);
    assert!(stored.stored_name.ends_with(".png"));
    assert_eq!(
        stored.url,
        format!("http://localhost:3000/images/users/{}", stored.stored_name)
    );

    let on_disk = std::path::Path::new(&dir).join("users").join(&stored.stored_name);
    assert!(on_disk.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_local_storage_store_no_extension() {
    let dir = format!("/tmp/bijou_test_{}", uuid::Uuid::new_v4());
    let storage = LocalStorage::new(&dir, "http://localhost:3000");

    let stored = storage
        .store("posters", "Makefile", "application/octet-stream", b"all: build")
        .await
        .expect("store failed");

    assert!(stored.stored_name.ends_with(".bin"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_local_storage_delete() {
    let dir = format!("/tmp/bijou_test_{}", uuid::Uuid::new_v4());
    let storage = LocalStorage::new(&dir, "http://localhost:3000");

    let stored = storage
        .store("posters", "gone.jpg", "image/jpeg", b"\xFF\xD8\xFF")
        .await
        .expect("store failed");

    let on_disk = std::path::Path::new(&dir).join("posters").join(&stored.stored_name);
    assert!(on_disk.exists());

    storage
        .delete("posters", &stored.stored_name)
        .await
        .expect("delete failed");
    assert!(!on_disk.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_local_storage_delete_missing_is_ok() {
    let dir = format!("/tmp/bijou_test_{}", uuid::Uuid::new_v4());
    let storage = LocalStorage::new(&dir, "http://localhost:3000");

    storage
        .delete("posters", "never-existed.png")
        .await
        .expect("delete failed");
}

#[tokio::test]
async fn test_local_storage_unique_stored_names() {
    let dir = format!("/tmp/bijou_test_{}", uuid::Uuid::new_v4());
    let storage = LocalStorage::new(&dir, "http://localhost:3000");

    let first = storage
        .store("users", "same.png", "image/png", b"one")
        .await
        .expect("store failed");
    let second = storage
        .store("users", "same.png", "image/png", b"two")
        .await
        .expect("store failed");

    assert_ne!(first.stored_name, second.stored_name);

    let _ = std::fs::remove_dir_all(&dir);
}
