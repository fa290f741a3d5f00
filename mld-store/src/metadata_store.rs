use mld_core::metadata::{FileMetadata, LevelMetadataDoc};

use crate::error::{StoreError, StoreResult};
use crate::object_store::ObjectStore;

pub async fn load_file_metadata(store: &dyn ObjectStore, path: &str) -> StoreResult<Option<FileMetadata>> {
    match store.get_all(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(other) => Err(other),
    }
}

pub async fn save_file_metadata(store: &dyn ObjectStore, path: &str, meta: &FileMetadata) -> StoreResult<()> {
    let body = serde_json::to_string(meta)?;
    store.put(path, body).await
}

pub async fn load_level_metadata(store: &dyn ObjectStore, path: &str) -> StoreResult<Option<LevelMetadataDoc>> {
    match store.get_all(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(other) => Err(other),
    }
}

pub async fn save_level_metadata(store: &dyn ObjectStore, path: &str, doc: &LevelMetadataDoc) -> StoreResult<()> {
    let body = serde_json::to_string(doc)?;
    store.put(path, body).await
}
