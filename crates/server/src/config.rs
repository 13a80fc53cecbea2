//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional.
//! - `PRINTSHARE_HOST` - Bind address (default: 127.0.0.1)
//! - `PRINTSHARE_PORT` - Listen port (default: 3000)
//! - `PRINTSHARE_BASE_URL` - Public URL (default: <http://localhost:3000>).
//!   An `https` URL turns on secure session cookies.
//! - `PRINTSHARE_HASH_MEMORY_KIB` - Argon2 memory cost in KiB
//! - `PRINTSHARE_HASH_ITERATIONS` - Argon2 iteration count
//! - `PRINTSHARE_DEMO_PASSWORD` - When set, demo accounts with this password
//!   and a sample catalogue are created at startup
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::HashCost;

const MIN_DEMO_PASSWORD_LENGTH: usize = 6;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
///
/// Implements `Debug` manually to redact the demo password.
#[derive(Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Argon2 cost for password hashing
    pub hash_cost: HashCost,
    /// Password for seeded demo accounts; seeding is off when `None`
    pub demo_password: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("hash_cost", &self.hash_cost)
            .field(
                "demo_password",
                &self.demo_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            hash_cost: HashCost::default(),
            demo_password: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ServerConfig {
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

    /// Build configuration from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let default_cost = HashCost::default();

        let host = parse_or(&lookup, "PRINTSHARE_HOST", defaults.host)?;
        let port = parse_or(&lookup, "PRINTSHARE_PORT", defaults.port)?;
        let base_url = lookup("PRINTSHARE_BASE_URL").unwrap_or(defaults.base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidEnvVar(
                "PRINTSHARE_BASE_URL".to_string(),
                "must start with http:// or https://".to_string(),
            ));
        }

        let hash_cost = HashCost {
            memory_kib: parse_or(&lookup, "PRINTSHARE_HASH_MEMORY_KIB", default_cost.memory_kib)?,
            iterations: parse_or(&lookup, "PRINTSHARE_HASH_ITERATIONS", default_cost.iterations)?,
        };

        let demo_password = lookup("PRINTSHARE_DEMO_PASSWORD")
            .map(|value| validate_demo_password(SecretString::from(value)))
            .transpose()?;

        Ok(Self {
            host,
            port,
            base_url,
            hash_cost,
            demo_password,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` flag.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Reject demo passwords the registration rules would not accept.
fn validate_demo_password(secret: SecretString) -> Result<SecretString, ConfigError> {
    let length = secret.expose_secret().chars().count();
    if length < MIN_DEMO_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            "PRINTSHARE_DEMO_PASSWORD".to_string(),
            format!("must be at least {MIN_DEMO_PASSWORD_LENGTH} characters (got {length})"),
        ));
    }
    Ok(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.hash_cost, HashCost::default());
        assert!(config.demo_password.is_none());
        assert!(config.sentry_dsn.is_none());
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PRINTSHARE_HOST", "0.0.0.0"),
            ("PRINTSHARE_PORT", "8080"),
            ("PRINTSHARE_BASE_URL", "https://printshare.example"),
            ("PRINTSHARE_HASH_MEMORY_KIB", "4096"),
            ("PRINTSHARE_HASH_ITERATIONS", "3"),
            ("PRINTSHARE_DEMO_PASSWORD", "demo-password"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.secure_cookies());
        assert_eq!(
            config.hash_cost,
            HashCost {
                memory_kib: 4096,
                iterations: 3,
            }
        );
        assert_eq!(
            config.demo_password.unwrap().expose_secret(),
            "demo-password"
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("PRINTSHARE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PRINTSHARE_PORT"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(load(&[("PRINTSHARE_BASE_URL", "localhost:3000")]).is_err());
    }

    #[test]
    fn test_short_demo_password() {
        let err = load(&[("PRINTSHARE_DEMO_PASSWORD", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_empty_sentry_dsn_is_unset() {
        let config = load(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_debug_redacts_demo_password() {
        let config = load(&[("PRINTSHARE_DEMO_PASSWORD", "super-secret-demo")]).unwrap();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-demo"));
    }
}
