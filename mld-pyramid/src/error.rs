use thiserror::Error;

use mld_store::StoreError;

pub type PyramidResult<T> = Result<T, PyramidError>;

#[derive(Debug, Error)]
pub enum PyramidError {
    #[error("raw input is empty")]
    EmptyRawInput,
    #[error(transparent)]
    Store(#[from] StoreError),
}
