//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (sessions)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `WOOCOMMERCE_STORE_URL` - WordPress site URL (e.g., <https://shop.example.com>)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `WOOCOMMERCE_CONSUMER_KEY` - REST API consumer key
//! - `WOOCOMMERCE_CONSUMER_SECRET` - REST API consumer secret
//! - `WOOCOMMERCE_TIMEOUT_SECS` - Upstream request timeout (default: 30)
//! - `CATEGORY_CACHE_TTL_SECS` - Category listing cache lifetime (default: 600)
//! - `ORDER_BACKEND` - `woocommerce` or `simulated` (default: woocommerce)
//! - `SIMULATED_ORDER_DELAY_MS` - Artificial latency of the simulated backend (default: 1500)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry tracing sample rate (default: 0.0)
//!
//! Both WooCommerce credentials must be set for the catalog to return data.
//! With either one missing the client fails closed (empty results).

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// WooCommerce REST API configuration
    pub woocommerce: WooCommerceConfig,
    /// Which order backend handles checkout submissions
    pub order_backend: OrderBackendKind,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// WooCommerce REST API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct WooCommerceConfig {
    /// WordPress site URL; the REST base is `{store_url}/wp-json/wc/v3`
    pub store_url: Url,
    /// Consumer key (HTTP Basic username)
    pub consumer_key: Option<SecretString>,
    /// Consumer secret (HTTP Basic password)
    pub consumer_secret: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long the category listing is cached
    pub category_cache_ttl: Duration,
}

impl std::fmt::Debug for WooCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &Option<SecretString>| if s.is_some() { "[REDACTED]" } else { "None" };
        f.debug_struct("WooCommerceConfig")
            .field("store_url", &self.store_url.as_str())
            .field("consumer_key", &redact(&self.consumer_key))
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("timeout", &self.timeout)
            .field("category_cache_ttl", &self.category_cache_ttl)
            .finish()
    }
}

impl WooCommerceConfig {
    /// Default upstream request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    /// Default category cache lifetime.
    pub const DEFAULT_CATEGORY_CACHE_TTL: Duration = Duration::from_secs(600);

    /// Configuration for a store with default timeouts.
    #[must_use]
    pub const fn new(
        store_url: Url,
        consumer_key: Option<SecretString>,
        consumer_secret: Option<SecretString>,
    ) -> Self {
        Self {
            store_url,
            consumer_key,
            consumer_secret,
            timeout: Self::DEFAULT_TIMEOUT,
            category_cache_ttl: Self::DEFAULT_CATEGORY_CACHE_TTL,
        }
    }

    /// Load WooCommerce settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `WOOCOMMERCE_STORE_URL` is missing or invalid,
    /// or a credential or timeout value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_url = parse_store_url(&get_required_env("WOOCOMMERCE_STORE_URL")?)?;
        let consumer_key = get_optional_credential("WOOCOMMERCE_CONSUMER_KEY", "ck_")?;
        let consumer_secret = get_optional_credential("WOOCOMMERCE_CONSUMER_SECRET", "cs_")?;
        let timeout = Duration::from_secs(get_parsed_env("WOOCOMMERCE_TIMEOUT_SECS", 30)?);
        let category_cache_ttl =
            Duration::from_secs(get_parsed_env("CATEGORY_CACHE_TTL_SECS", 600)?);

        Ok(Self {
            store_url,
            consumer_key,
            consumer_secret,
            timeout,
            category_cache_ttl,
        })
    }
}

/// Order backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBackendKind {
    /// Create orders through the WooCommerce REST API.
    WooCommerce,
    /// Simulate order creation in memory after an artificial delay.
    Simulated { delay: Duration },
}

impl OrderBackendKind {
    fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("ORDER_BACKEND", "woocommerce").as_str() {
            "woocommerce" => Ok(Self::WooCommerce),
            "simulated" => Ok(Self::Simulated {
                delay: Duration::from_millis(get_parsed_env("SIMULATED_ORDER_DELAY_MS", 1500)?),
            }),
            other => Err(ConfigError::InvalidEnvVar(
                "ORDER_BACKEND".to_string(),
                format!("expected 'woocommerce' or 'simulated', got '{other}'"),
            )),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_parsed_env("STOREFRONT_PORT", 3000)?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        let woocommerce = WooCommerceConfig::from_env()?;
        let order_backend = OrderBackendKind::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            woocommerce,
            order_backend,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate: get_parsed_env("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse and check the WooCommerce store URL.
fn parse_store_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("WOOCOMMERCE_STORE_URL".to_string(), e.to_string())
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "WOOCOMMERCE_STORE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "WOOCOMMERCE_STORE_URL".to_string(),
            "missing host".to_string(),
        ));
    }

    Ok(url)
}

/// Shannon entropy of `s` in bits per byte.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts = [0_u32; 256];
    for b in s.bytes() {
        if let Some(n) = counts.get_mut(usize::from(b)) {
            *n += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)] // credentials are short
    let len = s.len() as f64;
    counts
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = f64::from(n) / len;
            -p * p.log2()
        })
        .sum()
}

/// Check a WooCommerce REST credential.
///
/// Generated keys are `ck_` (consumer key) or `cs_` (consumer secret)
/// followed by 40 hex characters, so the body after the prefix must not look
/// like a placeholder and must be close to uniformly random.
fn validate_credential(value: &str, var_name: &str, prefix: &str) -> Result<(), ConfigError> {
    let Some(body) = value.strip_prefix(prefix) else {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a key starting with '{prefix}'"),
        ));
    };

    let lower = body.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(body);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). \
                 Generate a key under WooCommerce > Settings > Advanced > REST API."
            ),
        ));
    }

    Ok(())
}

/// Load an optional credential, validating it when present.
fn get_optional_credential(key: &str, prefix: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_credential(&value, key, prefix)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("aaaaaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!((shannon_entropy("0123456789abcdef") - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_generated_credential_accepted() {
        let result = validate_credential(
            "ck_3f9a1c7e52b84d06a9e1f2c3b4d5e6f708192a3b",
            "WOOCOMMERCE_CONSUMER_KEY",
            "ck_",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_credential_wrong_prefix() {
        let result = validate_credential(
            "cs_3f9a1c7e52b84d06a9e1f2c3b4d5e6f708192a3b",
            "WOOCOMMERCE_CONSUMER_KEY",
            "ck_",
        );
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_credential_placeholder() {
        let result = validate_credential("cs_your-consumer-secret", "WOOCOMMERCE_CONSUMER_SECRET", "cs_");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_credential_low_entropy() {
        let result = validate_credential(
            "ck_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "WOOCOMMERCE_CONSUMER_KEY",
            "ck_",
        );
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_parse_store_url() {
        let url = parse_store_url("https://shop.hearth.test").unwrap();
        assert_eq!(url.host_str(), Some("shop.hearth.test"));

        assert!(parse_store_url("ftp://shop.hearth.test").is_err());
        assert!(parse_store_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            woocommerce: WooCommerceConfig::new(
                Url::parse("https://shop.hearth.test").unwrap(),
                None,
                None,
            ),
            order_backend: OrderBackendKind::WooCommerce,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_woocommerce_config_debug_redacts_secrets() {
        let config = WooCommerceConfig::new(
            Url::parse("https://shop.hearth.test").unwrap(),
            Some(SecretString::from("ck_super_secret_key_value")),
            Some(SecretString::from("cs_super_secret_secret_value")),
        );

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("shop.hearth.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("ck_super_secret_key_value"));
        assert!(!debug_output.contains("cs_super_secret_secret_value"));
    }
}
