//! Key-value cache
//!
//! The key verifier remembers accepted credentials here. Two backends:
//!
//! - [`RespCache`]: a Redis server over RESP2 (`redis://`)
//! - [`MemoryCache`]: an in-process TTL map (`memory://`)
//!
//! The cache is optional. Failing to reach it at startup is logged and the
//! service runs without one.

mod config;
mod errors;
mod memory;
mod resp;

pub use config::CacheConfig;
pub use errors::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use resp::{
    encode_command, read_value, RedisUrl, RespCache, RespValue, DEFAULT_RETRY_BACKOFF,
    MAX_ARRAY_LEN, MAX_BULK_LEN,
};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::observability::Event;

/// URL scheme selecting the in-process backend
pub const MEMORY_SCHEME: &str = "memory://";

/// Shared cache contract
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Value stored under `key`, or `None` if absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Release the connection
    async fn close(&self) -> CacheResult<()>;
}

/// Open the configured cache.
///
/// Returns `None` when no URL is configured or the backend is unreachable.
pub async fn connect(config: &CacheConfig) -> Option<Arc<dyn KeyValueCache>> {
    let url = config.url.as_deref()?;

    if url.starts_with(MEMORY_SCHEME) {
        tracing::info!(event = %Event::CacheConnected, backend = "memory", "Cache ready");
        return Some(Arc::new(MemoryCache::new()));
    }

    match RespCache::connect(url, config.connect_timeout(), config.command_timeout()).await {
        Ok(cache) => {
            let cache = cache.with_retry_backoff(config.retry_backoff());
            tracing::info!(
                event = %Event::CacheConnected,
                backend = "redis",
                addr = %cache.url().addr(),
                "Cache connected"
            );
            Some(Arc::new(cache))
        }
        Err(e) => {
            tracing::warn!(
                event = %Event::CacheUnavailable,
                error = %e,
                "Cache unreachable, continuing without it"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_disabled() {
        assert!(connect(&CacheConfig::disabled()).await.is_none());
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let cache = connect(&CacheConfig::with_url("memory://")).await.unwrap();
        cache.set("k", "v", Duration::from_secs(5)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_connect_bad_url_is_not_fatal() {
        assert!(connect(&CacheConfig::with_url("ftp://nowhere")).await.is_none());
    }
}
