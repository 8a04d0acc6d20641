//! Disk-backed file store
//!
//! Uploads land under the configured directory with a random name; the
//! server exposes that directory under the public base URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use collab_core::{DomainError, FileRef, FileStore, RepoResult};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Random stored name that keeps a short alphanumeric extension
    fn stored_name(name: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.len() <= 16 && e.chars().all(|c| c.is_ascii_alphanumeric()));
        match ext {
            Some(ext) if !ext.is_empty() => format!("{id}.{}", ext.to_ascii_lowercase()),
            _ => id,
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn upload(&self, bytes: Vec<u8>, name: &str, mime: &str) -> RepoResult<FileRef> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DomainError::StorageError(e.to_string()))?;

        let stored = Self::stored_name(name);
        let size = bytes.len() as u64;
        tokio::fs::write(self.root.join(&stored), bytes)
            .await
            .map_err(|e| DomainError::StorageError(e.to_string()))?;

        debug!(file = %stored, size, "Stored upload");

        Ok(FileRef {
            url: format!("{}/{stored}", self.base_url),
            name: name.to_string(),
            mime: mime.to_string(),
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name_keeps_extension() {
        assert!(LocalFileStore::stored_name("Report.PDF").ends_with(".pdf"));
        assert!(!LocalFileStore::stored_name("notes").contains('.'));
        assert!(!LocalFileStore::stored_name("x.t@r").contains('@'));
    }

    #[tokio::test]
    async fn test_upload_writes_under_root() {
        let root = std::env::temp_dir().join(format!("collab-files-{}", Uuid::new_v4()));
        let store = LocalFileStore::new(&root, "/files/");

        let file = store
            .upload(b"hello".to_vec(), "hello.txt", "text/plain")
            .await
            .unwrap();

        assert!(file.url.starts_with("/files/"));
        assert_eq!(file.size, 5);
        let stored = file.url.trim_start_matches("/files/");
        assert_eq!(tokio::fs::read(root.join(stored)).await.unwrap(), b"hello");

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
