use thiserror::Error;

#[derive(Debug, Error)]
pub enum WordBloomError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Invalid blocklist entry at line {line}: {reason}")]
    InvalidInput { line: usize, reason: String },

    #[error("Blocklist selection produced no words")]
    EmptyBlocklist,

    #[error("Malformed filter encoding: {0}")]
    MalformedEncoding(String),

    #[error("Filter payload size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Membership query before a filter was loaded")]
    Uninitialized,

    #[error("Filter already loaded")]
    AlreadyLoaded,

    #[error("Invalid filter parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, WordBloomError>;
