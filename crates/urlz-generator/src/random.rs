use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{GeneratorError, Result};
use crate::unique::generate_unique_with;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tokio_util::sync::CancellationToken;
use urlz_core::{ReadRepository, ShortCode};

/// Generates a URL-safe random string of exactly `length` characters.
///
/// The output is drawn from the base64url alphabet (`A-Z a-z 0-9 - _`)
/// without padding, using the operating system's CSPRNG.
pub fn generate(length: usize) -> Result<String> {
    generate_with(&OsEntropy, length)
}

/// Same as [`generate`], reading random bytes from `entropy`.
pub fn generate_with<E>(entropy: &E, length: usize) -> Result<String>
where
    E: EntropySource + ?Sized,
{
    if length == 0 {
        return Err(GeneratorError::InvalidLength(length));
    }

    let mut bytes = vec![0u8; encoded_buffer_len(length)];
    entropy.fill(&mut bytes)?;
    let mut encoded = URL_SAFE_NO_PAD.encode(&bytes);

    // Rounding in the byte budget can still leave us short.
    while encoded.len() < length {
        let missing = length - encoded.len();
        let mut extra = vec![0u8; (missing * 3 + 3) / 4];
        entropy.fill(&mut extra)?;
        URL_SAFE_NO_PAD.encode_string(&extra, &mut encoded);
    }

    // base64url output is ASCII, so byte truncation is char truncation.
    encoded.truncate(length);
    Ok(encoded)
}

/// Number of random bytes drawn up front for a `length`-character id.
///
/// base64 turns 3 bytes into 4 characters; a partial group still needs a
/// whole extra byte.
fn encoded_buffer_len(length: usize) -> usize {
    let mut len = length * 3 / 4;
    if length % 3 != 0 {
        len += 1;
    }
    len
}

/// A fixed-length random short code generator.
#[derive(Debug, Clone)]
pub struct RandomGenerator<E = OsEntropy> {
    length: usize,
    entropy: E,
}

impl RandomGenerator<OsEntropy> {
    /// Creates a generator backed by the OS random source.
    pub fn new(length: usize) -> Result<Self> {
        Self::with_entropy(length, OsEntropy)
    }
}

impl<E: EntropySource> RandomGenerator<E> {
    pub fn with_entropy(length: usize, entropy: E) -> Result<Self> {
        if length == 0 {
            return Err(GeneratorError::InvalidLength(length));
        }
        Ok(Self { length, entropy })
    }

    /// Length of every code this generator produces.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates one candidate code. No uniqueness check is performed.
    pub fn generate(&self) -> Result<ShortCode> {
        generate_with(&self.entropy, self.length).map(ShortCode::new_unchecked)
    }

    /// Generates a code that `store` reports as free at the time of the check.
    ///
    /// See [`generate_unique`](crate::generate_unique) for the retry contract.
    pub async fn generate_unique<R>(
        &self,
        cancel: &CancellationToken,
        store: &R,
    ) -> Result<ShortCode>
    where
        R: ReadRepository + ?Sized,
    {
        generate_unique_with(&self.entropy, cancel, store, self.length).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::test_entropy::{BrokenEntropy, CountingEntropy};
    use std::collections::HashSet;

    fn is_url_safe(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    }

    /// Birthday-bound upper limit on the chance of any collision among `n`
    /// ids drawn uniformly from a 64-symbol alphabet.
    fn collision_probability_bound(n: u64, length: i32) -> f64 {
        let keyspace = 64f64.powi(length);
        (n * (n - 1)) as f64 / (2.0 * keyspace)
    }

    #[test]
    fn output_has_requested_length() {
        for length in 1..=128 {
            let id = generate(length).unwrap();
            assert_eq!(id.len(), length, "length {length}");
            assert_eq!(id.chars().count(), length, "length {length}");
        }
    }

    #[test]
    fn long_ids_have_requested_length() {
        let id = generate(1337).unwrap();
        assert_eq!(id.len(), 1337);
    }

    #[test]
    fn output_uses_url_safe_alphabet() {
        for length in [1, 5, 8, 33, 256] {
            let id = generate(length).unwrap();
            assert!(id.chars().all(is_url_safe), "unexpected char in {id}");
        }
    }

    #[test]
    fn zero_length_is_rejected() {
        let err = generate(0).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidLength(0)));
        assert!(RandomGenerator::new(0).is_err());
    }

    #[test]
    fn thousand_ids_are_distinct() {
        const COUNT: u64 = 1_000;
        const LENGTH: usize = 8;

        let bound = collision_probability_bound(COUNT, LENGTH as i32);
        assert!(bound < 1e-6, "collision bound too high: {bound}");

        let ids: HashSet<String> = (0..COUNT).map(|_| generate(LENGTH).unwrap()).collect();
        assert_eq!(ids.len(), COUNT as usize);
    }

    #[test]
    fn five_character_keyspace_bound() {
        // 64^5 ~ 1.07e9; a thousand ids stay well below a 1e-3 collision chance.
        assert!(collision_probability_bound(1_000, 5) < 1e-3);
    }

    #[test]
    fn buffer_len_covers_partial_groups() {
        assert_eq!(encoded_buffer_len(1), 1);
        assert_eq!(encoded_buffer_len(2), 2);
        assert_eq!(encoded_buffer_len(3), 2);
        assert_eq!(encoded_buffer_len(4), 4);
        assert_eq!(encoded_buffer_len(5), 4);
        assert_eq!(encoded_buffer_len(9), 6);
    }

    #[test]
    fn short_first_draw_is_topped_up() {
        // 9 chars -> 6 bytes -> 8 encoded chars, one short.
        let entropy = CountingEntropy::default();
        let id = generate_with(&entropy, 9).unwrap();
        assert_eq!(id.len(), 9);
        assert_eq!(entropy.calls(), 2);

        // 6 chars -> 4 bytes -> 6 encoded chars, no top-up.
        let entropy = CountingEntropy::default();
        generate_with(&entropy, 6).unwrap();
        assert_eq!(entropy.calls(), 1);
    }

    #[test]
    fn random_source_failure_is_propagated() {
        let err = generate_with(&BrokenEntropy, 5).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::RandomSource(getrandom::Error::UNSUPPORTED)
        ));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn generator_produces_codes_of_its_length() {
        let generator = RandomGenerator::new(7).unwrap();
        assert_eq!(generator.length(), 7);
        let code = generator.generate().unwrap();
        assert_eq!(code.as_str().len(), 7);
        assert!(ShortCode::new(code.as_str()).is_ok());
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
