//! Key Verifier Tests
//!
//! Two-tier verification against counting and failing fakes:
//! - a cache hit never consults the authorized set
//! - an authorized-set hit writes through to the cache
//! - cache failures degrade to the authorized set and never propagate
//! - a failed lookup is the only cache attempt of that verification

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use africa_energy_api::auth::{
    AuthorizedKeys, KeyVerifier, StaticKeySet, Verification, VERIFIED_KEY_TTL,
};
use africa_energy_api::cache::{CacheError, CacheResult, KeyValueCache, MemoryCache};
use africa_energy_api::observability::MetricsRegistry;

// =============================================================================
// Fakes
// =============================================================================

/// Authorized set that counts lookups
struct CountingKeys {
    inner: StaticKeySet,
    lookups: AtomicUsize,
}

impl CountingKeys {
    fn new(keys: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            inner: StaticKeySet::new(keys.iter().copied()),
            lookups: AtomicUsize::new(0),
        })
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl AuthorizedKeys for CountingKeys {
    fn contains(&self, key: &str) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.contains(key)
    }
}

/// Cache whose every call fails
struct FailingCache {
    calls: AtomicUsize,
}

impl FailingCache {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl KeyValueCache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Timeout(500))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Connect("connection refused".into()))
    }

    async fn close(&self) -> CacheResult<()> {
        Ok(())
    }
}

/// Cache that records TTLs of writes
#[derive(Default)]
struct RecordingCache {
    writes: Mutex<HashMap<String, (String, Duration)>>,
}

#[async_trait]
impl KeyValueCache for RecordingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let writes = self.writes.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(writes.get(key).map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut writes = self.writes.lock().map_err(|_| CacheError::Poisoned)?;
        writes.insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn close(&self) -> CacheResult<()> {
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_unavailable_cache_accepts_authorized_key() {
    let verifier = KeyVerifier::new(CountingKeys::new(&["k1"]), None);
    assert!(verifier.verify("k1").await);
}

#[tokio::test]
async fn test_failing_cache_rejects_unknown_key_without_error() {
    let cache = FailingCache::new();
    let metrics = Arc::new(MetricsRegistry::new());
    let verifier = KeyVerifier::new(CountingKeys::new(&["k1"]), Some(cache.clone()))
        .with_metrics(metrics.clone());

    assert!(!verifier.verify("unknown").await);
    // One lookup attempt, no write for a rejected key
    assert_eq!(cache.calls.load(Ordering::SeqCst), 1);
    assert_eq!(metrics.snapshot().key_cache_errors, 1);
}

#[tokio::test]
async fn test_failing_cache_still_accepts_authorized_key() {
    let cache = FailingCache::new();
    let metrics = Arc::new(MetricsRegistry::new());
    let verifier = KeyVerifier::new(CountingKeys::new(&["k1"]), Some(cache.clone()))
        .with_metrics(metrics.clone());

    assert_eq!(verifier.check("k1").await, Verification::AuthorizedSet);
    // Failed lookup skips the write-through
    assert_eq!(cache.calls.load(Ordering::SeqCst), 1);
    assert_eq!(metrics.snapshot().key_cache_errors, 1);
}

#[tokio::test]
async fn test_cached_key_accepted_outside_authorized_set() {
    let cache = Arc::new(MemoryCache::new());
    cache
        .set("api_key:X", "valid", Duration::from_secs(60))
        .await
        .unwrap();

    let keys = CountingKeys::new(&[]);
    let verifier = KeyVerifier::new(keys.clone(), Some(cache));

    assert_eq!(verifier.check("X").await, Verification::CacheHit);
    assert_eq!(keys.lookups(), 0);
}

#[tokio::test]
async fn test_non_sentinel_cache_value_is_ignored() {
    let cache = Arc::new(MemoryCache::new());
    cache
        .set("api_key:X", "revoked", Duration::from_secs(60))
        .await
        .unwrap();

    let verifier = KeyVerifier::new(CountingKeys::new(&[]), Some(cache));
    assert!(!verifier.verify("X").await);
}

#[tokio::test]
async fn test_second_verification_takes_fast_path() {
    let keys = CountingKeys::new(&["k1"]);
    let verifier = KeyVerifier::new(keys.clone(), Some(Arc::new(MemoryCache::new())));

    assert_eq!(verifier.check("k1").await, Verification::AuthorizedSet);
    assert_eq!(keys.lookups(), 1);

    assert_eq!(verifier.check("k1").await, Verification::CacheHit);
    assert_eq!(keys.lookups(), 1);
}

#[tokio::test]
async fn test_write_through_uses_fixed_ttl() {
    let cache = Arc::new(RecordingCache::default());
    let verifier = KeyVerifier::new(CountingKeys::new(&["k1"]), Some(cache.clone()));

    assert!(verifier.verify("k1").await);

    let writes = cache.writes.lock().unwrap();
    let (value, ttl) = writes.get("api_key:k1").unwrap();
    assert_eq!(value, "valid");
    assert_eq!(*ttl, VERIFIED_KEY_TTL);
    assert_eq!(VERIFIED_KEY_TTL, Duration::from_secs(3600));
}
