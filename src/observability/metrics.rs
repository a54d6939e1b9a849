//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by the gate and the data handlers.
///
/// All counters use Relaxed atomics; exact cross-counter consistency is not
/// required.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Requests denied by the gate
    requests_denied: AtomicU64,
    /// Credentials accepted from the cache
    key_cache_hits: AtomicU64,
    /// Credentials accepted from the authorized set
    key_authorized_set_hits: AtomicU64,
    /// Credentials rejected
    key_rejections: AtomicU64,
    /// Cache failures absorbed during verification
    key_cache_errors: AtomicU64,
    /// Queries returning at least one record
    queries_executed: AtomicU64,
    /// Queries returning no records
    queries_empty: AtomicU64,
    /// Queries failing in the store or while reshaping
    queries_failed: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Gate metrics

    pub fn increment_requests_denied(&self) {
        self.requests_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_key_cache_hits(&self) {
        self.key_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_key_authorized_set_hits(&self) {
        self.key_authorized_set_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_key_rejections(&self) {
        self.key_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_key_cache_errors(&self) {
        self.key_cache_errors.fetch_add(1, Ordering::Relaxed);
    }

    // Query metrics

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_empty(&self) {
        self.queries_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_denied: self.requests_denied.load(Ordering::Relaxed),
            key_cache_hits: self.key_cache_hits.load(Ordering::Relaxed),
            key_authorized_set_hits: self.key_authorized_set_hits.load(Ordering::Relaxed),
            key_rejections: self.key_rejections.load(Ordering::Relaxed),
            key_cache_errors: self.key_cache_errors.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_empty: self.queries_empty.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_denied: u64,
    pub key_cache_hits: u64,
    pub key_authorized_set_hits: u64,
    pub key_rejections: u64,
    pub key_cache_errors: u64,
    pub queries_executed: u64,
    pub queries_empty: u64,
    pub queries_failed: u64,
}
