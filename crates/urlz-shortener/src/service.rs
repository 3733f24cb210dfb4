use crate::error::{Result, ShortenerError};
use crate::shortener::Shortener;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use urlz_core::{Repository, ShortCode, UrlRecord};
use urlz_generator::RandomGenerator;

/// The [`Shortener`] used by the gateway.
///
/// Codes come from a [`RandomGenerator`] checked against the repository
/// itself. The check and the insert are separate steps, so a writer that
/// claims the same code in between makes `shorten` fail with
/// [`ShortenerError::Conflict`] rather than overwrite it.
///
/// Generation runs under a child of `shutdown`; cancelling it stops any
/// retry loop that is still looking for a free code.
#[derive(Debug, Clone)]
pub struct ShortenerService<R> {
    repository: Arc<R>,
    generator: RandomGenerator,
    shutdown: CancellationToken,
}

impl<R: Repository> ShortenerService<R> {
    pub fn new(repository: Arc<R>, generator: RandomGenerator, shutdown: CancellationToken) -> Self {
        Self {
            repository,
            generator,
            shutdown,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Fetches the record under `code` and checks that it points at `expected_url`.
    async fn current(&self, code: &ShortCode, expected_url: &str) -> Result<UrlRecord> {
        let record = self
            .repository
            .get(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?;

        if record.original_url != expected_url {
            debug!(code = %code, "stored url does not match the provided one");
            return Err(ShortenerError::UrlMismatch(code.to_string()));
        }

        Ok(record)
    }
}

/// Accepts absolute `http` and `https` URLs with a non-empty host.
pub fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(ShortenerError::InvalidUrl(
            "URL cannot be empty".to_string(),
        ));
    }

    if url.chars().any(char::is_whitespace) {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must not contain whitespace: {url}"
        )));
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must have a valid scheme and host: {url}"
        )));
    };

    let scheme = scheme.to_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL scheme must be http or https: {scheme}"
        )));
    }

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    if host.is_empty() || host.starts_with(':') {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must have a valid scheme and host: {url}"
        )));
    }

    Ok(())
}

#[async_trait]
impl<R: Repository> Shortener for ShortenerService<R> {
    async fn shorten(&self, original_url: &str) -> Result<ShortCode> {
        validate_url(original_url)?;

        let cancel = self.shutdown.child_token();
        let code = self
            .generator
            .generate_unique(&cancel, self.repository.as_ref())
            .await?;

        self.repository
            .insert(&code, UrlRecord::new(original_url))
            .await?;

        info!(code = %code, "shortened url");
        Ok(code)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self.repository.get(code).await?)
    }

    async fn update(&self, code: &ShortCode, old_url: &str, new_url: &str) -> Result<UrlRecord> {
        validate_url(new_url)?;

        let current = self.current(code, old_url).await?;
        let updated = current.with_url(new_url);

        if !self.repository.update(code, updated.clone()).await? {
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        info!(code = %code, "updated url");
        Ok(updated)
    }

    async fn delete(&self, code: &ShortCode, url: &str) -> Result<()> {
        validate_url(url)?;

        self.current(code, url).await?;

        if !self.repository.delete(code).await? {
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        info!(code = %code, "deleted url");
        Ok(())
    }
}
