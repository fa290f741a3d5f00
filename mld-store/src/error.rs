use thiserror::Error;

use mld_core::CodecError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("requested byte range is not satisfiable")]
    RangeNotSatisfiable,
    #[error("object store backend error: {0}")]
    Backend(String),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
