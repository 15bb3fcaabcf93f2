//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_API_URL` - Base URL of the storefront API (default: `http://localhost:3333`)
//! - `STOREFRONT_API_TOKEN` - Bearer token sent with every API request
//! - `STOREFRONT_API_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - How long catalog responses are cached (default: 300)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: `.rocketshoes`)
//! - `CART_STORAGE_NAMESPACE` - Prefix of the storage key (default: `@RocketShoes`)
//! - `CART_LOCALE` - Language of notifications, `en` or `pt-BR` (default: `en`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::notify::Locale;
use crate::storage::cart_key;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
const DEFAULT_STORAGE_DIR: &str = ".rocketshoes";
const DEFAULT_NAMESPACE: &str = "@RocketShoes";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Storefront API configuration
    pub api: StorefrontApiConfig,
    /// Directory used by file-backed cart storage
    pub storage_dir: PathBuf,
    /// Namespace prefixed to storage keys
    pub storage_namespace: String,
    /// Language used for user-facing notifications
    pub locale: Locale,
}

/// Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StorefrontApiConfig {
    /// Base URL, e.g. `http://localhost:3333`
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Time-to-live of cached catalog responses
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for StorefrontApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl StorefrontApiConfig {
    /// Configuration pointing at `base_url` with default timeouts and no token.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("STOREFRONT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_API_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        Ok(Self {
            base_url,
            token: lookup("STOREFRONT_API_TOKEN")
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
            timeout: get_secs(lookup, "STOREFRONT_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            catalog_cache_ttl: get_secs(lookup, "CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_TTL_SECS)?,
        })
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api = StorefrontApiConfig::from_lookup(&lookup)?;

        let storage_dir = PathBuf::from(
            lookup("CART_STORAGE_DIR").unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string()),
        );

        let storage_namespace =
            lookup("CART_STORAGE_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        if storage_namespace.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_NAMESPACE".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let locale = match lookup("CART_LOCALE") {
            Some(raw) => raw
                .parse::<Locale>()
                .map_err(|e| ConfigError::InvalidEnvVar("CART_LOCALE".to_string(), e))?,
            None => Locale::default(),
        };

        Ok(Self {
            api,
            storage_dir,
            storage_namespace,
            locale,
        })
    }

    /// Storage key of the persisted cart, e.g. `@RocketShoes:cart`.
    #[must_use]
    pub fn cart_key(&self) -> String {
        cart_key(&self.storage_namespace)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a whole number of seconds, falling back to `default` when unset.
fn get_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
