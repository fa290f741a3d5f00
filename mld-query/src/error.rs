use thiserror::Error;

use mld_store::StoreError;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("file name must not be empty")]
    EmptyName,
    #[error("unknown downsample strategy: {0}")]
    UnknownStrategy(String),
    #[error("preprocessing has not completed for this file")]
    PreprocessIncomplete,
    #[error(transparent)]
    Store(#[from] StoreError),
}
