use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{GeneratorError, Result};
use crate::random::generate_with;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use urlz_core::{ReadRepository, ShortCode};

/// Maximum number of candidates [`generate_unique`] checks before giving up.
///
/// Large enough that running out means the keyspace for the requested
/// length is saturated or the store is misbehaving.
pub const MAX_ATTEMPTS: usize = 1337;

/// Generates a `length`-character code that is not a key in `store`.
///
/// Each attempt draws a fresh candidate and performs one `exists` lookup.
/// A taken candidate is discarded and retried; a lookup error aborts
/// immediately. The check is best-effort: nothing stops another writer from
/// claiming the code between this lookup and the caller's insert.
///
/// Cancelling `cancel` stops the loop before the next attempt, or during an
/// in-flight lookup, with [`GeneratorError::Cancelled`].
pub async fn generate_unique<R>(
    cancel: &CancellationToken,
    store: &R,
    length: usize,
) -> Result<ShortCode>
where
    R: ReadRepository + ?Sized,
{
    generate_unique_with(&OsEntropy, cancel, store, length).await
}

/// Same as [`generate_unique`], reading random bytes from `entropy`.
pub async fn generate_unique_with<E, R>(
    entropy: &E,
    cancel: &CancellationToken,
    store: &R,
    length: usize,
) -> Result<ShortCode>
where
    E: EntropySource + ?Sized,
    R: ReadRepository + ?Sized,
{
    for attempt in 1..=MAX_ATTEMPTS {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }

        let candidate = ShortCode::new_unchecked(generate_with(entropy, length)?);

        let taken = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GeneratorError::Cancelled),
            result = store.exists(&candidate) => result.map_err(GeneratorError::StoreLookup)?,
        };

        if !taken {
            debug!(attempt, "found free short id");
            return Ok(candidate);
        }

        trace!(attempt, code = %candidate, "short id collision, retrying");
    }

    Err(GeneratorError::UniquenessExhausted {
        attempts: MAX_ATTEMPTS,
    })
}
