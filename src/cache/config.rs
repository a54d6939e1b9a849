//! Cache Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Key-value cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `redis://[:password@]host[:port][/db]`, `memory://`, or none to run
    /// without a cache (default: "redis://redis:6379")
    #[serde(default = "default_url")]
    pub url: Option<String>,

    /// Connect deadline in milliseconds (default: 2000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Per-command deadline in milliseconds (default: 500)
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Pause after a failed command before the server is tried again, in
    /// milliseconds (default: 5000)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_url() -> Option<String> {
    Some("redis://redis:6379".to_string())
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_command_timeout_ms() -> u64 {
    500
}

fn default_retry_backoff_ms() -> u64 {
    5000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl CacheConfig {
    /// Config pointing at the given URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Config with no cache
    pub fn disabled() -> Self {
        Self {
            url: None,
            ..Default::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.url.as_deref(), Some("redis://redis:6379"));
        assert_eq!(config.command_timeout(), Duration::from_millis(500));
        assert_eq!(config.retry_backoff(), Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_null_url_disables_cache() {
        let config: CacheConfig = serde_json::from_str(r#"{"url": null}"#).unwrap();
        assert_eq!(config.url, None);
    }
}
