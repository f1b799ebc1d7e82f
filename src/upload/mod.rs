/// Image upload: per-file validation and a disk-backed blob store that hands
/// back public URL paths.
// region:    --- Imports
use crate::error::MarketError;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;
// endregion: --- Imports

// region:    --- Limits

pub const MAX_FILES: usize = 5;
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Reject a file before anything is written.
pub fn validate_file(
    file_name: &str,
    content_type: Option<&str>,
    size: usize,
) -> Result<(), MarketError> {
    let content_type = content_type.unwrap_or_default();
    if !ALLOWED_TYPES.contains(&content_type) {
        return Err(MarketError::Validation(format!(
            "Invalid file type: {content_type}. Allowed: JPEG, PNG, WebP"
        )));
    }
    if size > MAX_FILE_SIZE {
        return Err(MarketError::Validation(format!(
            "File too large: {file_name}. Maximum size is 5MB"
        )));
    }
    Ok(())
}

// endregion: --- Limits

// region:    --- Image Store

pub struct ImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Write the bytes under a fresh uuid name, keeping the original
    /// extension; returns the public URL path.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, MarketError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(self.root.join(&filename), bytes).await?;
        info!(
            "{:<12} --> stored {} ({} bytes)",
            "Upload",
            filename,
            bytes.len()
        );
        Ok(format!("{}/{}", self.public_prefix, filename))
    }
}

// endregion: --- Image Store

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_disallowed_mime_types() {
        let err = validate_file("tree.gif", Some("image/gif"), 100).unwrap_err();
        match err {
            MarketError::Validation(msg) => {
                assert_eq!(msg, "Invalid file type: image/gif. Allowed: JPEG, PNG, WebP")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(validate_file("tree.jpg", None, 100).is_err());
    }

    #[test]
    fn rejects_oversize_files_by_name() {
        let err = validate_file("huge.png", Some("image/png"), MAX_FILE_SIZE + 1).unwrap_err();
        match err {
            MarketError::Validation(msg) => {
                assert_eq!(msg, "File too large: huge.png. Maximum size is 5MB")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_files_at_the_limit() {
        for mime in ["image/jpeg", "image/png", "image/webp"] {
            assert!(validate_file("ok.img", Some(mime), MAX_FILE_SIZE).is_ok());
        }
    }

    #[tokio::test]
    async fn save_writes_under_a_uuid_name_with_public_prefix() {
        let root = std::env::temp_dir().join(format!("tree-market-test-{}", Uuid::new_v4()));
        let store = ImageStore::new(&root, "/uploads/listings");

        let url = store.save("photo.JPG", b"not really a jpeg").await.unwrap();
        assert!(url.starts_with("/uploads/listings/"));
        assert!(url.ends_with(".jpg"));

        let filename = url.rsplit('/').next().unwrap();
        let written = tokio::fs::read(root.join(filename)).await.unwrap();
        assert_eq!(written, b"not really a jpeg");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn save_defaults_extension_when_missing() {
        let root = std::env::temp_dir().join(format!("tree-market-test-{}", Uuid::new_v4()));
        let store = ImageStore::new(&root, "/uploads/listings");

        let url = store.save("noext", b"bytes").await.unwrap();
        assert!(url.ends_with(".jpg"));

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
// endregion: --- Tests
