//! # Authorized Keys
//!
//! The static tier of key verification.

use std::collections::HashSet;

/// Membership check against the configured subscriber keys
pub trait AuthorizedKeys: Send + Sync {
    fn contains(&self, key: &str) -> bool;
}

/// Fixed key set built from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticKeySet {
    keys: HashSet<String>,
}

impl StaticKeySet {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl AuthorizedKeys for StaticKeySet {
    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}
