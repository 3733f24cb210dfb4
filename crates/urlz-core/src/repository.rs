use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the record was first stored.
    pub created_at: Timestamp,
    /// When the target URL was last replaced, if ever.
    pub updated_at: Option<Timestamp>,
}

impl UrlRecord {
    /// Creates a fresh record stamped with the current time.
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            created_at: Timestamp::now(),
            updated_at: None,
        }
    }

    /// Returns a copy pointing at `new_url`, stamped as updated now.
    pub fn with_url(&self, new_url: impl Into<String>) -> Self {
        Self {
            original_url: new_url.into(),
            created_at: self.created_at,
            updated_at: Some(Timestamp::now()),
        }
    }
}

/// A read-only view of a repository.
///
/// `exists` is the key-value lookup the ID generator checks candidates
/// against: `Ok(false)` means the key is free, `Ok(true)` means it is taken
/// and any `Err` is an infrastructure failure.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new URL record. Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, code: &ShortCode, record: UrlRecord) -> Result<()>;

    /// Replaces the record stored under an existing code.
    /// Returns `false` if there was nothing to replace.
    async fn update(&self, code: &ShortCode, record: UrlRecord) -> Result<bool>;

    /// Deletes the URL record for a given short code.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;
}
