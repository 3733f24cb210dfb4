use thiserror::Error;
use urlz_core::StorageError;
use urlz_generator::GeneratorError;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("url not found: {0}")]
    NotFound(String),
    #[error("url mismatch for id {0}")]
    UrlMismatch(String),
    #[error("short id already exists: {0}")]
    Conflict(String),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::Conflict(code),
            other => Self::Storage(other),
        }
    }
}
