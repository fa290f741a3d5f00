use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};

/// The byte-range blob store the pyramid engine is built against. The wire
/// protocol to a real object store (S3, GCS, ...) is out of scope; this
/// trait is the contract a caller's own client must satisfy.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_range(&self, key: &str, start: u64, end: u64) -> StoreResult<Vec<u8>>;
    async fn put(&self, key: &str, body: String) -> StoreResult<()>;
    async fn exists(&self, key: &str) -> StoreResult<bool>;
    async fn list_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

impl dyn ObjectStore {
    /// Convenience for callers that just want the whole object.
    pub async fn get_all(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.get_range(key, 0, u64::MAX).await
    }
}

/// In-memory `ObjectStore`, used across the test suites in place of a real
/// backend.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_range(&self, key: &str, start: u64, end: u64) -> StoreResult<Vec<u8>> {
        let objects = self.objects.read();
        let bytes = objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        let len = bytes.len() as u64;
        if start >= len {
            return Err(StoreError::RangeNotSatisfiable);
        }
        let end = end.min(len);
        Ok(bytes[start as usize..end as usize].to_vec())
    }

    async fn put(&self, key: &str, body: String) -> StoreResult<()> {
        self.objects.write().insert(key.to_string(), body.into_bytes());
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.objects.read().contains_key(key))
    }

    async fn list_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// `ObjectStore` backed by a local directory; keys map to relative paths
/// beneath `root`. Lets the CLI run against a real filesystem without a
/// cloud account.
pub struct LocalFsObjectStore {
    root: PathBuf,
}

impl LocalFsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalFsObjectStore {
    async fn get_range(&self, key: &str, start: u64, end: u64) -> StoreResult<Vec<u8>> {
        let path = self.resolve(key);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|_| StoreError::NotFound(key.to_string()))?;
        let len = bytes.len() as u64;
        if start >= len {
            return Err(StoreError::RangeNotSatisfiable);
        }
        let end = end.min(len);
        Ok(bytes[start as usize..end as usize].to_vec())
    }

    async fn put(&self, key: &str, body: String) -> StoreResult<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, body.into_bytes()).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(tokio::fs::metadata(self.resolve(key)).await.is_ok())
    }

    async fn list_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut out = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(e) => e,
                Err(_) => continue,
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    let key = rel.to_string_lossy().replace('\\', "/");
                    if key.starts_with(prefix) {
                        out.push(key);
                    }
                }
            }
        }
        out.sort();
        Ok(out)
    }
}
