//! Storage backends for URL records.
//!
//! [`InMemoryRepository`] keeps everything in process memory and is meant for
//! local runs and tests. [`RedisRepository`] stores records in Redis.

pub mod memory;
pub mod redis;

pub use memory::InMemoryRepository;
pub use redis::RedisRepository;
pub use urlz_core::{ReadRepository, Repository, StorageError, UrlRecord};
