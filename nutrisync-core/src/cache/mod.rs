//! Durable on-device key-value cache.
//!
//! Values are stored as JSON in a single SQLite table keyed by composite
//! strings (see [`CacheKey`]). Each key is last-write-wins and there is no
//! ordering across keys.
//!
//! Reads fail open: a payload that no longer decodes into the requested type
//! is logged and reported as absent.

mod keys;

pub use keys::{CacheKey, CacheKind};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use thiserror::Error;

use crate::db::init_cache_db;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to encode cache value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct LocalCache {
    pool: SqlitePool,
}

impl LocalCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the cache file at `path`, creating it and its directory if needed.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        Ok(Self::new(init_cache_db(path).await?))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, CacheError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM cache_entries WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some((raw,)) = row else {
            tracing::debug!(key = %key, "cache miss");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a single key. Returns whether it existed.
    pub async fn remove(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes every key starting with `prefix` and returns how many went.
    ///
    /// The prefix is compared literally, so `%` and `_` carry no pattern
    /// meaning. An empty prefix clears the whole cache.
    pub async fn remove_many(&self, prefix: &str) -> Result<u64, CacheError> {
        let prefix_len = prefix.chars().count() as i64;
        let result = sqlx::query("DELETE FROM cache_entries WHERE substr(key, 1, ?) = ?")
            .bind(prefix_len)
            .bind(prefix)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
