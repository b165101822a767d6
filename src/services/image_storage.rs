//! Vehicle image storage
//!
//! Uploaded images are plain files under `<upload_dir>/vehicles/`, served
//! statically at `/uploads/vehicles/<key>`. A storage key is
//! `<vehicle id>-<random id>.<ext>`; keys are generated here and never
//! taken from the client, and anything that is not a bare file name is
//! rejected before touching the filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMAGES_PER_UPLOAD: usize = 10;

const ALLOWED_TYPES: [(&str, &str); 5] = [
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

const ALLOWED_EXTENSIONS: [(&str, &str); 5] = [
    ("jpg", "jpg"),
    ("jpeg", "jpg"),
    ("png", "png"),
    ("webp", "webp"),
    ("gif", "gif"),
];

/// One uploaded file as received from the multipart body
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingImage {
    fn label(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }
}

/// Check size and type; returns the file extension to store under.
///
/// A declared image content type decides the extension. A missing or
/// generic (`application/octet-stream`) content type falls back to the
/// file name's extension. Any other declared type is rejected.
pub fn validate_image(image: &IncomingImage) -> AppResult<&'static str> {
    if image.bytes.is_empty() {
        return Err(AppError::UploadConstraint(format!("File {} is empty", image.label())));
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::UploadConstraint(format!(
            "File {} exceeds the 5MB size limit",
            image.label()
        )));
    }

    let content_type = image
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    let extension = match content_type {
        Some(ct) => ALLOWED_TYPES.iter().find(|(allowed, _)| *allowed == ct).map(|(_, ext)| *ext),
        None => image
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .and_then(|ext| ALLOWED_EXTENSIONS.iter().find(|(allowed, _)| *allowed == ext).map(|(_, e)| *e)),
    };

    extension.ok_or_else(|| {
        AppError::UploadConstraint(format!(
            "File {} is not an allowed image type (jpeg, png, webp, gif)",
            image.label()
        ))
    })
}

/// Local filesystem image store
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
    public_base_url: String,
}

impl ImageStorage {
    pub fn new(upload_dir: impl AsRef<Path>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: upload_dir.as_ref().join("vehicles"),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// A fresh key for one of `vehicle_id`'s images
    pub fn new_key(vehicle_id: Uuid, extension: &str) -> String {
        format!("{}-{}.{}", vehicle_id.simple(), Uuid::new_v4().simple(), extension)
    }

    /// Bare file names only: no separators, no dot-files, no `..`
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key.len() <= 255
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.contains("..")
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/uploads/vehicles/{}", self.public_base_url, key)
    }

    fn path_for(&self, key: &str) -> std::io::Result<PathBuf> {
        if !Self::is_valid_key(key) {
            return Err(std::io::Error::new(ErrorKind::InvalidInput, format!("invalid storage key '{}'", key)));
        }
        Ok(self.root.join(key))
    }

    pub async fn write(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.path_for(key)?;
        self.ensure_root().await?;
        tokio::fs::write(path, bytes).await
    }

    /// Remove a stored file; `Ok(false)` when it was already gone
    pub async fn delete(&self, key: &str) -> std::io::Result<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.path_for(key) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Keys of every stored file, sorted
    pub async fn list_keys(&self) -> std::io::Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, content_type: Option<&str>, size: usize) -> IncomingImage {
        IncomingImage {
            file_name: Some(name.to_string()),
            content_type: content_type.map(str::to_string),
            bytes: vec![7u8; size],
        }
    }

    #[test]
    fn test_validate_image_types() {
        assert_eq!(validate_image(&image("a.jpeg", Some("image/jpeg"), 10)).unwrap(), "jpg");
        assert_eq!(validate_image(&image("a.bin", Some("image/png"), 10)).unwrap(), "png");
        assert_eq!(validate_image(&image("a.WEBP", None, 10)).unwrap(), "webp");
        assert_eq!(validate_image(&image("a.gif", Some("application/octet-stream"), 10)).unwrap(), "gif");
        assert!(validate_image(&image("a.jpg", Some("text/plain"), 10)).is_err());
        assert!(validate_image(&image("a.exe", None, 10)).is_err());
    }

    #[test]
    fn test_validate_image_size() {
        assert!(validate_image(&image("a.png", Some("image/png"), MAX_IMAGE_BYTES)).is_ok());
        assert!(matches!(
            validate_image(&image("a.png", Some("image/png"), MAX_IMAGE_BYTES + 1)),
            Err(AppError::UploadConstraint(_))
        ));
        assert!(matches!(
            validate_image(&image("a.png", Some("image/png"), 0)),
            Err(AppError::UploadConstraint(_))
        ));
    }

    #[test]
    fn test_key_rules() {
        let key = ImageStorage::new_key(Uuid::new_v4(), "jpg");
        assert!(ImageStorage::is_valid_key(&key));
        assert!(key.ends_with(".jpg"));
        assert!(!ImageStorage::is_valid_key("../secret.jpg"));
        assert!(!ImageStorage::is_valid_key("a/b.jpg"));
        assert!(!ImageStorage::is_valid_key("a\\b.jpg"));
        assert!(!ImageStorage::is_valid_key(".hidden"));
        assert!(!ImageStorage::is_valid_key(""));
    }

    #[test]
    fn test_url_for() {
        let storage = ImageStorage::new("/tmp/uploads", "https://dealer.test/");
        assert_eq!(storage.url_for("k.png"), "https://dealer.test/uploads/vehicles/k.png");
    }

    #[tokio::test]
    async fn test_write_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "http://localhost:5000");

        assert!(storage.list_keys().await.unwrap().is_empty());
        storage.write("b.png", b"png").await.unwrap();
        storage.write("a.jpg", b"jpg").await.unwrap();
        assert_eq!(storage.list_keys().await.unwrap(), vec!["a.jpg", "b.png"]);
        assert!(storage.exists("a.jpg").await);

        assert!(storage.delete("a.jpg").await.unwrap());
        assert!(!storage.delete("a.jpg").await.unwrap());
        assert!(storage.delete("../a.jpg").await.is_err());
        assert_eq!(storage.list_keys().await.unwrap(), vec!["b.png"]);
    }
}
