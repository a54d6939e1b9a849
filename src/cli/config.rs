//! Service settings
//!
//! Loaded from an optional JSON file, then overridden by environment
//! variables:
//!
//! | Variable                | Setting                          |
//! |-------------------------|----------------------------------|
//! | `APP_ENV`               | `environment` (dev, test, prod)  |
//! | `APP_NAME`              | `app_name`                       |
//! | `HOST` / `PORT`         | `server.host` / `server.port`    |
//! | `DATA_DIR`              | `database.data_dir`              |
//! | `REDIS_URL`             | `cache.url`                      |
//! | `AUTHORIZED_API_KEYS`   | `auth.api_keys` (comma-separated)|
//! | `RAPIDAPI_PROXY_SECRET` | `auth.proxy_secret`              |
//! | `LOG_LEVEL`             | `log_level`                      |

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::auth::{redact, AuthConfig};
use crate::cache::CacheConfig;
use crate::http_server::HttpServerConfig;
use crate::observability::{LogFormat, LOG_LEVELS};
use crate::store::DatabaseConfig;

use super::errors::{CliError, CliResult};

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" => Ok(Environment::Prod),
            other => Err(CliError::config_error(format!(
                "Invalid APP_ENV: '{}'. Expected dev, test or prod.",
                other
            ))),
        }
    }
}

/// Effective service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Service name reported in logs (default: "africaenergyapi")
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub environment: Environment,

    /// Always true in dev
    #[serde(default)]
    pub debug: bool,

    /// Log filter level (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_app_name() -> String {
    "africaenergyapi".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            environment: Environment::default(),
            debug: false,
            log_level: default_log_level(),
            server: HttpServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Settings {
    /// Load from `path` (if given) and the process environment, then validate
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let settings = Self::from_sources(path, |key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` (if given) and `lookup`, without validating
    pub fn from_sources<F>(path: Option<&Path>, lookup: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(lookup)?;

        if settings.environment == Environment::Dev {
            settings.debug = true;
        }

        Ok(settings)
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    fn apply_env<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("APP_ENV") {
            self.environment = env.parse()?;
        }
        if let Some(name) = lookup("APP_NAME") {
            self.app_name = name;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| CliError::config_error(format!("Invalid PORT: '{}'", port)))?;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.database.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.cache.url = if url.trim().is_empty() {
                None
            } else {
                Some(url)
            };
        }
        if let Some(keys) = lookup("AUTHORIZED_API_KEYS") {
            self.auth.api_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(secret) = lookup("RAPIDAPI_PROXY_SECRET") {
            self.auth.proxy_secret = Some(secret).filter(|s| !s.is_empty());
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level.trim().to_ascii_lowercase();
        }
        Ok(())
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> CliResult<()> {
        if self.server.port == 0 {
            return Err(CliError::config_error("PORT must be non-zero"));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(CliError::config_error(format!(
                "Invalid log level: '{}'. Expected one of {}.",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.environment == Environment::Prod && self.cache.url.is_none() {
            return Err(CliError::config_error(
                "A cache URL (REDIS_URL) is required in prod",
            ));
        }

        Ok(())
    }

    /// Non-fatal problems worth logging at startup
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.auth.api_keys.is_empty() {
            warnings.push("No authorized API keys configured; only cached keys will be accepted");
        }
        if self.auth.proxy_secret.is_none() {
            warnings.push("No RapidAPI proxy secret configured; any proxy secret header is accepted");
        }
        warnings
    }

    /// Human-readable logs in dev, JSON elsewhere
    pub fn log_format(&self) -> LogFormat {
        match self.environment {
            Environment::Dev => LogFormat::Pretty,
            Environment::Test | Environment::Prod => LogFormat::Json,
        }
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.auth.api_keys = copy.auth.api_keys.iter().map(|k| redact(k)).collect();
        copy.auth.proxy_secret = copy.auth.proxy_secret.as_ref().map(|_| "***".to_string());
        copy.cache.url = copy.cache.url.as_deref().map(redact_url);
        copy
    }
}

/// Mask the userinfo of a URL
fn redact_url(url: &str) -> String {
    match (url.split_once("://"), url.rfind('@')) {
        (Some((scheme, _)), Some(at)) => format!("{}://***{}", scheme, &url[at..]),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_sources(None, env(&[])).unwrap();
        assert_eq!(settings.environment, Environment::Dev);
        assert!(settings.debug);
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.cache.url.as_deref(), Some("redis://redis:6379"));
        assert_eq!(settings.log_format(), LogFormat::Pretty);
        settings.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::from_sources(
            None,
            env(&[
                ("APP_ENV", "PROD"),
                ("PORT", "9000"),
                ("REDIS_URL", "redis://cache:6379/1"),
                ("AUTHORIZED_API_KEYS", "k1, k2,,"),
                ("RAPIDAPI_PROXY_SECRET", "shh"),
                ("LOG_LEVEL", "WARN"),
                ("DATA_DIR", "/srv/data"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.environment, Environment::Prod);
        assert!(!settings.debug);
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.cache.url.as_deref(), Some("redis://cache:6379/1"));
        assert_eq!(settings.auth.api_keys, vec!["k1", "k2"]);
        assert_eq!(settings.auth.proxy_secret.as_deref(), Some("shh"));
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.database.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(settings.log_format(), LogFormat::Json);
        settings.validate().unwrap();
    }

    #[test]
    fn test_invalid_env_values() {
        assert!(Settings::from_sources(None, env(&[("APP_ENV", "staging")])).is_err());
        assert!(Settings::from_sources(None, env(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn test_validation() {
        let settings = Settings::from_sources(None, env(&[("PORT", "0")])).unwrap();
        assert!(settings.validate().is_err());

        let settings = Settings::from_sources(None, env(&[("LOG_LEVEL", "loud")])).unwrap();
        assert!(settings.validate().is_err());

        let settings =
            Settings::from_sources(None, env(&[("APP_ENV", "prod"), ("REDIS_URL", "")])).unwrap();
        assert!(settings.validate().is_err());

        let settings = Settings::from_sources(None, env(&[("REDIS_URL", "")])).unwrap();
        assert!(settings.validate().is_ok());
        assert!(!settings.warnings().is_empty());
    }

    #[test]
    fn test_file_then_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let file = json!({
            "app_name": "energy",
            "server": { "port": 8100 },
            "auth": { "api_keys": ["from-file"] }
        });
        fs::write(&path, file.to_string()).unwrap();

        let settings = Settings::from_sources(Some(&path), env(&[("HOST", "127.0.0.1")])).unwrap();
        assert_eq!(settings.app_name, "energy");
        assert_eq!(settings.server.port, 8100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.auth.api_keys, vec!["from-file"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");
        assert!(Settings::from_sources(Some(&path), env(&[])).is_err());
    }

    #[test]
    fn test_redacted() {
        let settings = Settings::from_sources(
            None,
            env(&[
                ("AUTHORIZED_API_KEYS", "supersecretkey"),
                ("RAPIDAPI_PROXY_SECRET", "shh"),
                ("REDIS_URL", "redis://default:pw@cache:6379"),
            ]),
        )
        .unwrap()
        .redacted();

        assert_eq!(settings.auth.api_keys, vec!["supe***"]);
        assert_eq!(settings.auth.proxy_secret.as_deref(), Some("***"));
        assert_eq!(settings.cache.url.as_deref(), Some("redis://***@cache:6379"));
    }
}
