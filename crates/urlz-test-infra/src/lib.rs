//! Disposable backing services for integration tests.
//!
//! Everything here starts a Docker container through `testcontainers`, so
//! tests using it need a reachable Docker daemon.

pub mod error;
pub mod redis;

pub use error::{Result, TestInfraError};
pub use redis::{RedisConfig, RedisServer};
