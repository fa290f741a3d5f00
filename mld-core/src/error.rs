use thiserror::Error;

/// Result alias for record codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed record line: {0}")]
    BadRecord(String),
}
