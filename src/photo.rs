//! Employee photos: upload validation, blob storage and URL resolution.
//!
//! The database only ever stores the generated filename. URLs are derived on
//! the way out by [`resolve_photo_url`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::messages;
use crate::validation::ValidationError;

/// URL prefix the upload directory is served under.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Maximum file size (5MB)
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// `None` stays `None`; a stored filename becomes its public URL.
#[must_use]
pub fn resolve_photo_url(photo: Option<&str>) -> Option<String> {
    photo.map(|filename| format!("{UPLOADS_PREFIX}/{filename}"))
}

/// Blob store keyed by filename.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<()>;

    /// Removing a file that is already gone is not an error.
    async fn remove(&self, filename: &str) -> std::io::Result<()>;
}

/// Stores photos as files under one directory.
#[derive(Clone, Debug)]
pub struct DiskPhotoStore {
    root: PathBuf,
}

impl DiskPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only the final path component is honoured, so a stored name can
    /// never point outside the upload directory.
    fn path_for(&self, filename: &str) -> std::io::Result<PathBuf> {
        Path::new(filename)
            .file_name()
            .map(|name| self.root.join(name))
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid photo filename: {filename:?}"),
                )
            })
    }
}

#[async_trait]
impl PhotoStore for DiskPhotoStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "photo stored");
        Ok(())
    }

    async fn remove(&self, filename: &str) -> std::io::Result<()> {
        let path = self.path_for(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "photo removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// A validated photo waiting to be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoUpload {
    filename: String,
    bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Accepts `.jpg`, `.jpeg` and `.png` originals (any case) up to
    /// [`MAX_PHOTO_BYTES`], and assigns the stored filename.
    pub fn new(original_name: &str, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| ValidationError::new("photo", messages::ONLY_IMAGES))?;

        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(ValidationError::new("photo", messages::FILE_TOO_LARGE));
        }

        Ok(Self {
            filename: stored_filename(&extension),
            bytes,
        })
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// `{unix_millis}-{random}.{ext}`
fn stored_filename(extension: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    format!("{millis}-{}.{extension}", Uuid::new_v4().simple())
}
