//! In-process stand-ins for the directory and blob storage

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use collab_core::entities::{Employee, FileRef};
use collab_core::traits::{DirectoryService, FileStore, RepoResult};

/// Directory with a fixed roster
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    employees: Vec<Employee>,
}

impl StaticDirectory {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }
}

#[async_trait]
impl DirectoryService for StaticDirectory {
    async fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        Ok(self.employees.clone())
    }
}

/// Keeps uploaded bytes in memory, addressed by their URL
#[derive(Debug)]
pub struct MemoryFileStore {
    base_url: String,
    next_id: AtomicU64,
    files: DashMap<String, Vec<u8>>,
}

impl MemoryFileStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
            files: DashMap::new(),
        }
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.files.get(url).map(|f| f.clone())
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn upload(&self, bytes: Vec<u8>, name: &str, mime: &str) -> RepoResult<FileRef> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("{}/{id}-{name}", self.base_url);
        let size = bytes.len() as u64;
        self.files.insert(url.clone(), bytes);

        Ok(FileRef {
            url,
            name: name.to_string(),
            mime: mime.to_string(),
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab_core::value_objects::Snowflake;

    #[tokio::test]
    async fn test_upload_returns_reference() {
        let store = MemoryFileStore::new("/files/");
        let file = store
            .upload(b"abc".to_vec(), "notes.txt", "text/plain")
            .await
            .unwrap();
        assert_eq!(file.url, "/files/1-notes.txt");
        assert_eq!(file.size, 3);
        assert_eq!(store.get(&file.url).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_static_directory_lookup() {
        let directory = StaticDirectory::new(vec![Employee::new(Snowflake::new(1), "Alice Smith")]);
        assert!(directory.find_employee(Snowflake::new(1)).await.unwrap().is_some());
        assert!(directory.find_employee(Snowflake::new(2)).await.unwrap().is_none());
    }
}
