use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("invalid rate limit quota: {0}")]
    InvalidQuota(String),
}
