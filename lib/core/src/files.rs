//! File-blob storage contract.
//!
//! Uploaded resources are referenced by an opaque [`ResourceId`] and resolved
//! to a name, a type (the lower-cased extension) and bytes.

use crate::error::FileStorageError;
use crate::id::{ResourceId, path_component_violation};
use async_trait::async_trait;
use rootcause::Report;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use ulid::Ulid;

/// Suffix of the sidecar file holding a blob's original name.
const NAME_SUFFIX: &str = ".name";

/// Trait for file-blob storage.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores the content and returns its resource id.
    async fn upload(
        &self,
        content: &[u8],
        fname: &str,
    ) -> Result<ResourceId, Report<FileStorageError>>;

    /// Returns the original file name of a resource, if known.
    async fn fname(&self, resource_id: &ResourceId) -> Option<String>;

    /// Returns the data type (lower-cased extension) of a resource.
    fn dtype(&self, resource_id: &ResourceId) -> Option<String> {
        resource_id.extension()
    }

    /// Returns the stored bytes of a resource.
    async fn download(
        &self,
        resource_id: &ResourceId,
    ) -> Result<Vec<u8>, Report<FileStorageError>>;
}

/// File storage backed by a single directory.
///
/// A blob uploaded as `report.pdf` is stored as `{root}/{ulid}.pdf`, with
/// `report.pdf` written to the `{ulid}.pdf.name` sidecar.
#[derive(Debug, Clone)]
pub struct DirFileStorage {
    root: PathBuf,
}

impl DirFileStorage {
    /// Opens (creating if needed) a storage rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is a regular file or cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, Report<FileStorageError>> {
        let root = root.into();
        ensure_dir(&root).await?;
        Ok(Self { root })
    }

    /// Returns the storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, resource_id: &ResourceId) -> Result<PathBuf, FileStorageError> {
        if path_component_violation(resource_id.as_str()).is_some() {
            return Err(FileStorageError::InvalidId {
                resource_id: resource_id.to_string(),
            });
        }
        Ok(self.root.join(resource_id.as_str()))
    }
}

#[async_trait]
impl FileStorage for DirFileStorage {
    async fn upload(
        &self,
        content: &[u8],
        fname: &str,
    ) -> Result<ResourceId, Report<FileStorageError>> {
        let ext = Path::new(fname)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let stem = Ulid::new().to_string().to_lowercase();
        let resource_id = ResourceId::new_unchecked(match ext {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        });

        let path = self.blob_path(&resource_id)?;
        fs::write(&path, content).await.map_err(|e| io_error(&path, &e))?;
        let name_path = sidecar_path(&path);
        fs::write(&name_path, fname)
            .await
            .map_err(|e| io_error(&name_path, &e))?;

        tracing::debug!(resource_id = %resource_id, size = content.len(), "Stored resource");
        Ok(resource_id)
    }

    async fn fname(&self, resource_id: &ResourceId) -> Option<String> {
        let path = self.blob_path(resource_id).ok()?;
        match fs::read_to_string(sidecar_path(&path)).await {
            Ok(name) => Some(name),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(resource_id = %resource_id, error = %e, "Failed to read resource name");
                None
            }
        }
    }

    async fn download(
        &self,
        resource_id: &ResourceId,
    ) -> Result<Vec<u8>, Report<FileStorageError>> {
        let path = self.blob_path(resource_id)?;
        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FileStorageError::NotFound {
                resource_id: resource_id.to_string(),
            }
            .into()),
            Err(e) => Err(io_error(&path, &e).into()),
        }
    }
}

fn sidecar_path(blob: &Path) -> PathBuf {
    let mut name = blob.as_os_str().to_owned();
    name.push(NAME_SUFFIX);
    PathBuf::from(name)
}

fn io_error(path: &Path, e: &std::io::Error) -> FileStorageError {
    FileStorageError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Creates `path` as a directory unless it already is one.
///
/// # Errors
///
/// Returns an error if `path` is an existing regular file or creation fails.
pub async fn ensure_dir(path: &Path) -> Result<(), Report<FileStorageError>> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FileStorageError::Io {
            path: path.display().to_string(),
            reason: "path is a file".to_string(),
        }
        .into()),
        Err(_) => fs::create_dir_all(path)
            .await
            .map_err(|e| io_error(path, &e).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn upload_then_download() {
        let dir = TempDir::new().expect("tempdir");
        let storage = DirFileStorage::open(dir.path()).await.expect("open");

        let id = storage
            .upload(b"%PDF-1.4", "Report.PDF")
            .await
            .expect("upload");

        assert_eq!(storage.dtype(&id), Some("pdf".to_string()));
        assert_eq!(storage.fname(&id).await, Some("Report.PDF".to_string()));
        assert_eq!(storage.download(&id).await.expect("download"), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn upload_without_extension_has_no_dtype() {
        let dir = TempDir::new().expect("tempdir");
        let storage = DirFileStorage::open(dir.path()).await.expect("open");

        let id = storage.upload(b"data", "README").await.expect("upload");
        assert_eq!(storage.dtype(&id), None);
    }

    #[tokio::test]
    async fn download_missing_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let storage = DirFileStorage::open(dir.path()).await.expect("open");

        let err = storage
            .download(&ResourceId::new_unchecked("missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            FileStorageError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn traversal_ids_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let storage = DirFileStorage::open(dir.path()).await.expect("open");

        let err = storage
            .download(&ResourceId::new_unchecked("../secret.txt"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            FileStorageError::InvalidId { .. }
        ));
        assert_eq!(storage.fname(&ResourceId::new_unchecked("../x")).await, None);
    }

    #[tokio::test]
    async fn open_on_a_file_fails() {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").expect("write");

        assert!(DirFileStorage::open(&file).await.is_err());
    }
}
