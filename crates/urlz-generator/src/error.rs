use thiserror::Error;
use urlz_core::StorageError;

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors returned by short ID generation.
///
/// Only a confirmed collision is retried internally; every variant here
/// reaches the caller unchanged.
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("short id length must be positive, got {0}")]
    InvalidLength(usize),
    #[error("secure random source failed: {0}")]
    RandomSource(#[source] getrandom::Error),
    #[error("uniqueness lookup failed: {0}")]
    StoreLookup(#[source] StorageError),
    #[error("no free short id found after {attempts} attempts")]
    UniquenessExhausted { attempts: usize },
    #[error("short id generation was cancelled")]
    Cancelled,
}
