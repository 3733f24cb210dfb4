use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, trace, warn};
use urlz_core::error::{Result, StorageError};
use urlz_core::{ReadRepository, Repository, ShortCode, UrlRecord};

const DEFAULT_KEY_PREFIX: &str = "urlz:";

/// A Redis-backed repository.
///
/// Each record is stored as a JSON string under `<prefix><short code>`.
/// Inserts use `SET NX` and updates use `SET XX`, so neither can clobber
/// or resurrect a key by accident.
#[derive(Clone)]
pub struct RedisRepository {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StorageError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

fn decode_record(key: &str, raw: &str) -> Result<UrlRecord> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::InvalidData(format!("invalid value for key '{key}': {e}")))
}

fn encode_record(record: &UrlRecord) -> Result<String> {
    serde_json::to_string(record)
        .map_err(|e| StorageError::InvalidData(format!("failed to serialize record: {e}")))
}

impl RedisRepository {
    /// Creates a repository on top of an existing connection.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a repository with a custom key prefix (e.g. "myapp:url:").
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid redis url", e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to redis", e))?;
        Ok(Self::new(conn))
    }

    fn key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }

    /// `SET key value <condition>`; `true` if Redis applied the write.
    async fn conditional_set(&self, key: &str, value: String, condition: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg(condition)
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to write value to redis", e))?;
        Ok(reply.is_some())
    }
}

impl std::fmt::Debug for RedisRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRepository")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReadRepository for RedisRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let key = self.key(code);
        trace!(code = %code, "fetching url record from redis");

        let mut conn = self.conn.clone();
        let raw = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| map_redis_error("failed to fetch value from redis", e))?;

        match raw {
            Some(raw) => decode_record(&key, &raw).map(Some).inspect_err(|e| {
                warn!(code = %code, error = %e, "stored record is unreadable");
            }),
            None => Ok(None),
        }
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let key = self.key(code);
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(&key)
            .await
            .map_err(|e| map_redis_error("failed to check key in redis", e))
    }
}

#[async_trait]
impl Repository for RedisRepository {
    async fn insert(&self, code: &ShortCode, record: UrlRecord) -> Result<()> {
        let key = self.key(code);
        let json = encode_record(&record)?;

        if self.conditional_set(&key, json, "NX").await? {
            debug!(code = %code, "stored url record in redis");
            Ok(())
        } else {
            Err(StorageError::Conflict(code.to_string()))
        }
    }

    async fn update(&self, code: &ShortCode, record: UrlRecord) -> Result<bool> {
        let key = self.key(code);
        let json = encode_record(&record)?;

        let updated = self.conditional_set(&key, json, "XX").await?;
        debug!(code = %code, updated, "updated url record in redis");
        Ok(updated)
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let key = self.key(code);
        let mut conn = self.conn.clone();
        let removed = conn
            .del::<_, usize>(&key)
            .await
            .map_err(|e| map_redis_error("failed to delete value from redis", e))?;
        Ok(removed > 0)
    }
}
