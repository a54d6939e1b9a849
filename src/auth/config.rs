//! Auth Configuration

use serde::{Deserialize, Serialize};

use super::keys::StaticKeySet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Subscriber keys accepted without a cache entry
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Expected `X-RapidAPI-Proxy-Secret`; any value is accepted when unset
    #[serde(default)]
    pub proxy_secret: Option<String>,
}

impl AuthConfig {
    pub fn key_set(&self) -> StaticKeySet {
        StaticKeySet::new(self.api_keys.iter().map(|k| k.trim()))
    }
}
