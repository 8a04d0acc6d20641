//! Directory lookups with a short-lived cache
//!
//! Mention resolution reads the whole roster on every post; the cache keeps
//! that from reaching the directory each time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use collab_core::{DirectoryService, Employee, RepoResult, Snowflake};
use parking_lot::RwLock;
use tracing::debug;

/// Caches `list_employees` for a fixed time
pub struct CachedDirectory {
    inner: Arc<dyn DirectoryService>,
    ttl: Duration,
    cached: RwLock<Option<(Instant, Arc<Vec<Employee>>)>>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn DirectoryService>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Drop the cached roster
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }

    async fn roster(&self) -> RepoResult<Arc<Vec<Employee>>> {
        let fresh = self
            .cached
            .read()
            .as_ref()
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, employees)| Arc::clone(employees));
        if let Some(employees) = fresh {
            return Ok(employees);
        }

        let employees = Arc::new(self.inner.list_employees().await?);
        debug!(count = employees.len(), "Directory roster refreshed");
        *self.cached.write() = Some((Instant::now(), Arc::clone(&employees)));
        Ok(employees)
    }
}

impl std::fmt::Debug for CachedDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedDirectory")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DirectoryService for CachedDirectory {
    async fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        Ok(self.roster().await?.as_ref().clone())
    }

    async fn find_employee(&self, id: Snowflake) -> RepoResult<Option<Employee>> {
        Ok(self.roster().await?.iter().find(|e| e.id == id).cloned())
    }
}

/// Current names keyed by employee id
pub async fn name_index(directory: &dyn DirectoryService) -> RepoResult<HashMap<Snowflake, String>> {
    Ok(directory
        .list_employees()
        .await?
        .into_iter()
        .map(|e| (e.id, e.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DirectoryService for CountingDirectory {
        async fn list_employees(&self) -> RepoResult<Vec<Employee>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Employee::new(Snowflake::new(1), "Alice Kim")])
        }
    }

    #[tokio::test]
    async fn test_roster_is_reused_within_ttl() {
        let inner = Arc::new(CountingDirectory {
            calls: AtomicUsize::new(0),
        });
        let directory = CachedDirectory::new(inner.clone(), Duration::from_secs(60));

        directory.list_employees().await.unwrap();
        let found = directory.find_employee(Snowflake::new(1)).await.unwrap();
        assert_eq!(found.unwrap().name, "Alice Kim");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        directory.invalidate();
        directory.list_employees().await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let inner = Arc::new(CountingDirectory {
            calls: AtomicUsize::new(0),
        });
        let directory = CachedDirectory::new(inner.clone(), Duration::ZERO);

        directory.list_employees().await.unwrap();
        directory.list_employees().await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_name_index() {
        let inner = CountingDirectory {
            calls: AtomicUsize::new(0),
        };
        let names = name_index(&inner).await.unwrap();
        assert_eq!(names[&Snowflake::new(1)], "Alice Kim");
    }
}
