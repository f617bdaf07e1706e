use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// Image extensions accepted for avatars and posters.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["webp", "png", "jpg", "jpeg"];

/// Metadata about a stored file.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredFile {
    /// Original filename from the upload
    pub filename: String,
    /// Stored filename (UUID-based to avoid collisions)
    pub stored_name: String,
    /// MIME content type
    pub content_type: String,
    /// File size in bytes
    pub size: u64,
    /// Public URL for the file
    pub url: String,
}

/// Storage backend trait for pluggable file storage.
///
/// `category` is the image namespace ("users" for avatars, "posters" for
/// movie posters). Both operations return definite results; callers never
/// have to probe for half-written state.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store file bytes and return the stored file's metadata.
    async fn store(
        &self,
        category: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredFile, ApiError>;

    /// Delete a file by its stored name.
    async fn delete(&self, category: &str, stored_name: &str) -> Result<(), ApiError>;
}

/// Local filesystem storage backend.
///
/// Files land in `<root>/<category>/<uuid>.<ext>` and are served from
/// `<public_base_url>/images/<category>/<uuid>.<ext>`.
#[derive(Clone)]
pub struct LocalStorage {
    pub root: PathBuf,
    pub public_base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        LocalStorage {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    async fn ensure_dir(&self, category: &str) -> Result<PathBuf, ApiError> {
        let dir = self.root.join(category);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to create upload dir: {}", e)))?;
        Ok(dir)
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn store(
        &self,
        category: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredFile, ApiError> {
        let dir = self.ensure_dir(category).await?;

        // Unique stored name, keeping the original extension
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        let file_path = dir.join(&stored_name);

        tokio::fs::write(&file_path, data)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to write file: {}", e)))?;

        Ok(StoredFile {
            filename: filename.to_string(),
            stored_name: stored_name.clone(),
            content_type: content_type.to_string(),
            size: data.len() as u64,
            url: format!("{}/images/{}/{}", self.public_base_url, category, stored_name),
        })
    }

    async fn delete(&self, category: &str, stored_name: &str) -> Result<(), ApiError> {
        let file_path = self.root.join(category).join(stored_name);
        if file_path.exists() {
            tokio::fs::remove_file(&file_path)
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to delete file: {}", e)))?;
        }
        Ok(())
    }
}

/// A file part collected from a multipart form.
#[derive(Debug, Clone)]
pub struct FormFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Text fields and file parts collected from a multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, FormFile>,
}

impl FormData {
    /// Get a trimmed text field, treating blank values as absent.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn file(&self, name: &str) -> Option<&FormFile> {
        self.files.get(name)
    }
}

/// Drain a multipart request into text fields and file parts.
pub async fn collect_form(mut multipart: Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(|s| s.to_string()) {
            let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_else(|| {
                mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .to_string()
            });
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read file part: {}", e)))?;
            form.files.insert(
                name,
                FormFile {
                    filename,
                    content_type,
                    data,
                },
            );
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read field: {}", e)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Validate an uploaded image part against the extension whitelist and the
/// configured size cap.
pub fn validate_image(file: &FormFile, max_size: u64) -> Result<(), ApiError> {
    let ext = Path::new(&file.filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::UnsupportedMedia(
            "only .png, .jpg, .jpeg and .webp images are allowed".to_string(),
        ));
    }

    if file.data.len() as u64 > max_size {
        return Err(ApiError::UnsupportedMedia(format!(
            "image must be {}MB or smaller",
            max_size / 1_000_000
        )));
    }

    Ok(())
}

/// Extract the stored file name from a public image URL. Returns `None` for
/// the shared default image, which must never be deleted.
pub fn stored_name_from_url(url: &str) -> Option<&str> {
    let name = url.rsplit('/').next()?;
    if name.is_empty() || name == "default.png" {
        return None;
    }
    Some(name)
}
