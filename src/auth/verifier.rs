//! # Key Verifier
//!
//! Two-tier lookup: the cache first, then the authorized key set. A key
//! found in the set is written back to the cache so the next request takes
//! the fast path.
//!
//! The cache tier never fails a request. Lookup or write errors are logged
//! and verification falls through to the authorized set. The whole tier runs
//! under one deadline per verification, and a failed lookup skips the
//! write-through.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::cache::{CacheError, KeyValueCache};
use crate::observability::{Event, MetricsRegistry};

use super::keys::AuthorizedKeys;

/// Prefix of cache entries holding verified keys
pub const CACHE_KEY_PREFIX: &str = "api_key:";

/// Value marking a verified key
pub const VALID_SENTINEL: &str = "valid";

/// Lifetime of a verified-key cache entry
pub const VERIFIED_KEY_TTL: Duration = Duration::from_secs(3600);

/// Default deadline for all cache calls of one verification
pub const DEFAULT_CACHE_BUDGET: Duration = Duration::from_millis(500);

/// Cache entry name for a credential
pub fn cache_key(credential: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, credential)
}

/// Credential prefix safe to log
pub fn redact(credential: &str) -> String {
    let prefix: String = credential.chars().take(4).collect();
    format!("{}***", prefix)
}

/// How a verification was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Cache held the valid sentinel
    CacheHit,
    /// Found in the authorized set
    AuthorizedSet,
    /// Found nowhere
    Rejected,
}

impl Verification {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Verification::Rejected)
    }
}

pub struct KeyVerifier {
    keys: Arc<dyn AuthorizedKeys>,
    cache: Option<Arc<dyn KeyValueCache>>,
    cache_budget: Duration,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl KeyVerifier {
    pub fn new(keys: Arc<dyn AuthorizedKeys>, cache: Option<Arc<dyn KeyValueCache>>) -> Self {
        Self {
            keys,
            cache,
            cache_budget: DEFAULT_CACHE_BUDGET,
            metrics: None,
        }
    }

    /// Bound the time one verification may spend on the cache
    pub fn with_cache_budget(mut self, budget: Duration) -> Self {
        self.cache_budget = budget;
        self
    }

    /// Count outcomes in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// True if the credential is accepted
    pub async fn verify(&self, credential: &str) -> bool {
        self.check(credential).await.is_accepted()
    }

    /// Verify and report which tier decided
    pub async fn check(&self, credential: &str) -> Verification {
        let entry = cache_key(credential);
        let deadline = Instant::now() + self.cache_budget;
        let mut cache_healthy = true;

        if let Some(cache) = &self.cache {
            match timeout_at(deadline, cache.get(&entry)).await {
                Ok(Ok(Some(value))) if value == VALID_SENTINEL => {
                    tracing::debug!(
                        event = %Event::KeyCacheHit,
                        key = %redact(credential),
                        "API key verified from cache"
                    );
                    self.count(|m| m.increment_key_cache_hits());
                    return Verification::CacheHit;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    cache_healthy = false;
                    self.cache_failed("get", &e);
                }
                Err(_) => {
                    cache_healthy = false;
                    self.cache_failed("get", &self.budget_exceeded());
                }
            }
        }

        if !self.keys.contains(credential) {
            tracing::info!(
                event = %Event::KeyRejected,
                key = %redact(credential),
                "API key rejected"
            );
            self.count(|m| m.increment_key_rejections());
            return Verification::Rejected;
        }

        if let Some(cache) = self.cache.as_ref().filter(|_| cache_healthy) {
            match timeout_at(deadline, cache.set(&entry, VALID_SENTINEL, VERIFIED_KEY_TTL)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.cache_failed("set", &e),
                Err(_) => self.cache_failed("set", &self.budget_exceeded()),
            }
        }

        tracing::debug!(
            event = %Event::KeyAuthorizedSetHit,
            key = %redact(credential),
            "API key verified from authorized set"
        );
        self.count(|m| m.increment_key_authorized_set_hits());
        Verification::AuthorizedSet
    }

    fn budget_exceeded(&self) -> CacheError {
        CacheError::Timeout(self.cache_budget.as_millis() as u64)
    }

    fn cache_failed(&self, op: &str, error: &dyn std::fmt::Display) {
        tracing::warn!(
            event = %Event::KeyCacheError,
            op = op,
            error = %error,
            "Key cache unavailable, using authorized set"
        );
        self.count(|m| m.increment_key_cache_errors());
    }

    fn count(&self, f: impl FnOnce(&MetricsRegistry)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}

impl std::fmt::Debug for KeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVerifier")
            .field("has_cache", &self.cache.is_some())
            .finish()
    }
}
