//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional, with defaults:
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Port number (default: 3000)
//! - `SHAPESHIFT_API_BASE_URL` - Catalog API base URL including the version
//!   prefix (default: `http://localhost:5023/api/v1`)
//! - `SHAPESHIFT_API_TIMEOUT_SECS` - Upstream request timeout (default: 30)
//! - `STOREFRONT_DATA_DIR` - Directory for persisted cart, addresses and
//!   token (default: .shapeshift)
//! - `STOREFRONT_CATALOG_SOURCE` - `remote` to serve the catalog API's
//!   products, `local` for the locally administered catalog (default: remote)
//! - `CHECKOUT_STORE_NAME` - Store name in the order message header
//! - `CHECKOUT_ENDPOINT` - Chat deep-link base (default: <https://wa.me>)
//! - `CHECKOUT_PHONE` - Store phone, international format, digits only
//! - `SENTRY_DSN` - Sentry DSN for error tracking

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::{ApiConfig, DEFAULT_BASE_URL};
use crate::checkout::{CheckoutSettings, DEFAULT_ENDPOINT, DEFAULT_PHONE, DEFAULT_STORE_NAME};

/// Default directory for locally persisted state.
pub const DEFAULT_DATA_DIR: &str = ".shapeshift";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the storefront's products and categories come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSource {
    /// Fetched from the catalog API and refreshed on demand.
    #[default]
    Remote,
    /// Persisted in the data directory and seeded with the built-in catalog.
    Local,
}

impl std::str::FromStr for CatalogSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => Err(format!("expected 'remote' or 'local', got '{other}'")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Server bind address
    pub host: IpAddr,
    /// Server port
    pub port: u16,
    /// Upstream catalog API
    pub api: ApiConfig,
    /// Where cart, addresses and the auth token are persisted
    pub data_dir: PathBuf,
    /// Catalog backing
    pub catalog_source: CatalogSource,
    /// Order handoff settings
    pub checkout: CheckoutSettings,
    /// Sentry DSN for error tracking (optional)
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let api = ApiConfig::from_env()?;
        let checkout = checkout_from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR));
        let catalog_source = get_env_or_default("STOREFRONT_CATALOG_SOURCE", "remote")
            .parse::<CatalogSource>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_CATALOG_SOURCE".to_string(), e))?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            api,
            data_dir,
            catalog_source,
            checkout,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    /// Load upstream API settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL or timeout does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&get_env_or_default(
            "SHAPESHIFT_API_BASE_URL",
            DEFAULT_BASE_URL,
        ))?;
        let timeout = get_env_or_default("SHAPESHIFT_API_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "SHAPESHIFT_API_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout),
        })
    }
}

fn checkout_from_env() -> Result<CheckoutSettings, ConfigError> {
    let endpoint = get_env_or_default("CHECKOUT_ENDPOINT", DEFAULT_ENDPOINT);
    Url::parse(&endpoint).map_err(|e| {
        ConfigError::InvalidEnvVar("CHECKOUT_ENDPOINT".to_string(), e.to_string())
    })?;

    let phone = get_env_or_default("CHECKOUT_PHONE", DEFAULT_PHONE);
    validate_phone(&phone, "CHECKOUT_PHONE")?;

    Ok(CheckoutSettings {
        store_name: get_env_or_default("CHECKOUT_STORE_NAME", DEFAULT_STORE_NAME),
        endpoint: endpoint.trim_end_matches('/').to_owned(),
        phone,
        ..CheckoutSettings::default()
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an API base URL. Only http(s) is accepted.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("SHAPESHIFT_API_BASE_URL".to_string(), reason)
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}

/// The deep link takes the number verbatim in its path.
fn validate_phone(phone: &str, var_name: &str) -> Result<(), ConfigError> {
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must contain digits only, country code first (e.g. 918975944936)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_digits_only() {
        assert!(validate_phone("918975944936", "TEST_PHONE").is_ok());
    }

    #[test]
    fn test_validate_phone_rejects_formatting() {
        for bad in ["+91 89759 44936", "91-8975944936", ""] {
            let err = validate_phone(bad, "TEST_PHONE").unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(ref var, _) if var == "TEST_PHONE"));
        }
    }

    #[test]
    fn test_parse_base_url() {
        let url = parse_base_url(DEFAULT_BASE_URL).unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(5023));

        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://example.com/api").is_err());
    }

    #[test]
    fn test_catalog_source_parse() {
        assert_eq!("remote".parse::<CatalogSource>(), Ok(CatalogSource::Remote));
        assert_eq!(" Local ".parse::<CatalogSource>(), Ok(CatalogSource::Local));
        assert!("sqlite".parse::<CatalogSource>().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            api: ApiConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap()),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            catalog_source: CatalogSource::Remote,
            checkout: CheckoutSettings::default(),
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
