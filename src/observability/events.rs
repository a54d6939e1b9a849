//! Observability events
//!
//! Every log line carries an `event` field naming one of these. Events are
//! explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Settings loaded and validated
    ConfigLoaded,
    /// Server bound and accepting requests
    Serving,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Collaborators
    DatabaseConnected,
    DatabaseClosed,
    CacheConnected,
    /// Cache could not be reached at startup; serving without it
    CacheUnavailable,
    CacheClosed,

    // Key verification
    /// Credential found in the cache
    KeyCacheHit,
    /// Credential found in the authorized set (cache written through)
    KeyAuthorizedSetHit,
    /// Credential rejected by cache and authorized set
    KeyRejected,
    /// Cache lookup or write failed; degraded to the authorized set
    KeyCacheError,
    /// Request denied by the gate
    RequestDenied,

    // Query
    QueryCompiled,
    QueryExecuted,
    /// Query returned no records
    QueryEmpty,
    QueryFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::DatabaseConnected => "DATABASE_CONNECTED",
            Event::DatabaseClosed => "DATABASE_CLOSED",
            Event::CacheConnected => "CACHE_CONNECTED",
            Event::CacheUnavailable => "CACHE_UNAVAILABLE",
            Event::CacheClosed => "CACHE_CLOSED",

            Event::KeyCacheHit => "KEY_CACHE_HIT",
            Event::KeyAuthorizedSetHit => "KEY_AUTHORIZED_SET_HIT",
            Event::KeyRejected => "KEY_REJECTED",
            Event::KeyCacheError => "KEY_CACHE_ERROR",
            Event::RequestDenied => "REQUEST_DENIED",

            Event::QueryCompiled => "QUERY_COMPILED",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryEmpty => "QUERY_EMPTY",
            Event::QueryFailed => "QUERY_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::BootStart,
            Event::ConfigLoaded,
            Event::Serving,
            Event::ShutdownStart,
            Event::ShutdownComplete,
            Event::DatabaseConnected,
            Event::DatabaseClosed,
            Event::CacheConnected,
            Event::CacheUnavailable,
            Event::CacheClosed,
            Event::KeyCacheHit,
            Event::KeyAuthorizedSetHit,
            Event::KeyRejected,
            Event::KeyCacheError,
            Event::RequestDenied,
            Event::QueryCompiled,
            Event::QueryExecuted,
            Event::QueryEmpty,
            Event::QueryFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::KeyCacheHit), "KEY_CACHE_HIT");
        assert_eq!(format!("{}", Event::QueryExecuted), "QUERY_COMPLETE");
    }
}
