//! Per-client token-bucket rate limiting.
//!
//! A [`RateLimiterRegistry`] lazily creates one [`Limiter`] per client key
//! and hands the same shared bucket to every caller using that key.

pub mod error;
mod limiter;
mod registry;

pub use error::RateLimitError;
pub use limiter::{quota_for, Limiter};
pub use registry::RateLimiterRegistry;
