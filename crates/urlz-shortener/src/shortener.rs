use crate::error::Result;
use async_trait::async_trait;
use urlz_core::{ShortCode, UrlRecord};

/// The operations behind the HTTP surface.
///
/// Every mutation that names an existing link must also carry the URL the
/// caller believes is stored there; a stale URL is rejected with
/// [`UrlMismatch`](crate::ShortenerError::UrlMismatch).
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Stores `original_url` under a freshly generated short code.
    async fn shorten(&self, original_url: &str) -> Result<ShortCode>;

    /// Looks up the record stored under `code`.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Points `code` at `new_url`, provided it currently points at `old_url`.
    async fn update(&self, code: &ShortCode, old_url: &str, new_url: &str) -> Result<UrlRecord>;

    /// Removes `code`, provided it currently points at `url`.
    async fn delete(&self, code: &ShortCode, url: &str) -> Result<()>;
}
