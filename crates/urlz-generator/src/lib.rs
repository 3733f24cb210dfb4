//! Random short ID generation.
//!
//! [`generate`] produces a URL-safe random string of a fixed length.
//! [`generate_unique`] repeats that until a backing store reports the
//! candidate as free, up to [`MAX_ATTEMPTS`] times.

mod entropy;
pub mod error;
mod random;
mod unique;

pub use entropy::{EntropySource, OsEntropy};
pub use error::GeneratorError;
pub use random::{generate, generate_with, RandomGenerator};
pub use unique::{generate_unique, generate_unique_with, MAX_ATTEMPTS};
