//! Connector configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CONNECTOR_BASE_URL` - Public URL the connector is reachable at
//!
//! ## Optional
//! - `CONNECTOR_HOST` - Bind address (default: 127.0.0.1)
//! - `CONNECTOR_PORT` - Listen port (default: 3003)
//! - `DATABASE_URL` - `PostgreSQL` connection string; when absent the
//!   connector runs on the in-memory platform (local development only)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Tracing sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
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

/// Connector application configuration.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the connector
    pub base_url: String,
    /// `PostgreSQL` connection URL (contains password); `None` selects the
    /// in-memory platform
    pub database_url: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ConnectorConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_or(&lookup, "CONNECTOR_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&lookup, "CONNECTOR_PORT", 3003)?;

        let base_url = lookup("CONNECTOR_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("CONNECTOR_BASE_URL".to_string()))?;
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CONNECTOR_BASE_URL".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);

        Ok(Self {
            host,
            port,
            base_url,
            database_url,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.trim().is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.trim().is_empty()),
            sentry_sample_rate: parse_or(&lookup, "SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_or(&lookup, "SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// The socket address to bind the listener to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(ToString::to_string)
    }

    #[test]
    fn test_defaults_applied() {
        let config = ConnectorConfig::from_lookup(lookup(&[(
            "CONNECTOR_BASE_URL",
            "https://connector.example.com",
        )]))
        .expect("load");
        assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.port, 3003);
        assert!(config.database_url.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_base_url() {
        let err = ConnectorConfig::from_lookup(lookup(&[])).expect_err("missing");
        assert!(matches!(err, ConfigError::MissingEnvVar(v) if v == "CONNECTOR_BASE_URL"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ConnectorConfig::from_lookup(lookup(&[("CONNECTOR_BASE_URL", "not a url")]))
            .expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidEnvVar(v, _) if v == "CONNECTOR_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ConnectorConfig::from_lookup(lookup(&[
            ("CONNECTOR_BASE_URL", "https://connector.example.com"),
            ("CONNECTOR_PORT", "eighty"),
        ]))
        .expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidEnvVar(v, _) if v == "CONNECTOR_PORT"));
    }

    #[test]
    fn test_socket_addr() {
        let config = ConnectorConfig::from_lookup(lookup(&[
            ("CONNECTOR_BASE_URL", "https://connector.example.com"),
            ("CONNECTOR_HOST", "0.0.0.0"),
            ("CONNECTOR_PORT", "8080"),
        ]))
        .expect("load");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }
}
