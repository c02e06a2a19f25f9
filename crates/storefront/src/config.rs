//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>).
//!   An `https` URL turns on secure cookies.
//! - `STOREFRONT_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `PREVIEW_CACHE_CAPACITY` - Rendered product previews kept in memory (default: 256)
//! - `VISITOR_CAPACITY` - Visitors whose cart and design are kept (default: 10000)
//! - `SESSION_CAPACITY` - Session records kept in memory (default: 10000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Maximum number of cached product preview images
    pub preview_cache_capacity: u64,
    /// Maximum number of visitors with a stored cart and design
    pub visitor_capacity: u64,
    /// Maximum number of session records
    pub session_capacity: u64,
    /// Emit JSON logs instead of human-readable text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            preview_cache_capacity: DEFAULT_PREVIEW_CACHE_CAPACITY,
            visitor_capacity: DEFAULT_VISITOR_CAPACITY,
            session_capacity: DEFAULT_SESSION_CAPACITY,
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_STATIC_DIR: &str = "crates/storefront/static";
const DEFAULT_PREVIEW_CACHE_CAPACITY: u64 = 256;
const DEFAULT_VISITOR_CAPACITY: u64 = 10_000;
const DEFAULT_SESSION_CAPACITY: u64 = 10_000;

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url =
            parse_base_url(&get_env_or_default("STOREFRONT_BASE_URL", DEFAULT_BASE_URL))?;
        let static_dir =
            PathBuf::from(get_env_or_default("STOREFRONT_STATIC_DIR", DEFAULT_STATIC_DIR));
        let preview_cache_capacity = parse_env(
            "PREVIEW_CACHE_CAPACITY",
            &DEFAULT_PREVIEW_CACHE_CAPACITY.to_string(),
        )?;
        let visitor_capacity =
            parse_env("VISITOR_CAPACITY", &DEFAULT_VISITOR_CAPACITY.to_string())?;
        let session_capacity =
            parse_env("SESSION_CAPACITY", &DEFAULT_SESSION_CAPACITY.to_string())?;
        let json_logs =
            get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            static_dir,
            preview_cache_capacity,
            visitor_capacity,
            session_capacity,
            json_logs,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the secure cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    get_required_env(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate in `[0, 1]`.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

/// Parse the public base URL; only http and https are accepted.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_BASE_URL".to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            port: 8080,
            ..StorefrontConfig::default()
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_default_is_not_secure() {
        let config = StorefrontConfig::default();
        assert!(!config.is_secure());
        assert_eq!(config.preview_cache_capacity, 256);
        assert_eq!(config.visitor_capacity, 10_000);
        assert_eq!(config.session_capacity, 10_000);
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = StorefrontConfig {
            base_url: parse_base_url("https://eleganthaven.com").unwrap(),
            ..StorefrontConfig::default()
        };
        assert!(config.is_secure());
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://eleganthaven.com").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("http://localhost:3000").is_ok());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("ELEGANT_HAVEN_TEST_UNSET_PORT", "4000").unwrap();
        assert_eq!(port, 4000);
    }

    #[test]
    fn test_parse_env_reports_invalid_default() {
        let result = parse_env::<u16>("ELEGANT_HAVEN_TEST_UNSET_PORT", "not-a-port");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "ELEGANT_HAVEN_TEST_UNSET_PORT"
        ));
    }

    #[test]
    fn test_parse_rate_bounds() {
        let rate = parse_rate("ELEGANT_HAVEN_TEST_UNSET_RATE", "0.25").unwrap();
        assert!((rate - 0.25).abs() < f32::EPSILON);
        assert!(parse_rate("ELEGANT_HAVEN_TEST_UNSET_RATE", "1.5").is_err());
        assert!(parse_rate("ELEGANT_HAVEN_TEST_UNSET_RATE", "-0.1").is_err());
    }
}
