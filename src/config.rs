//! Configuration management.
//!
//! All configuration comes from the environment (optionally seeded from a
//! `.env` file by the binary). There is no configuration file: the server
//! has exactly three knobs.

use secrecy::SecretString;
use std::time::Duration;

use crate::{Error, Result};

/// Default HTTP request timeout in seconds.
///
/// Bounds how long a stuck BlueBubbles request can hold the contact-cache
/// refresh slot (and any tool call) before failing.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the BlueBubbles server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the BlueBubbles server, without a trailing slash.
    pub base_url: String,
    /// Server password, sent as a query parameter on every request.
    pub password: SecretString,
    /// Request timeout for all upstream calls.
    pub timeout: Duration,
}

impl ServerConfig {
    /// Creates the configuration from environment variables.
    ///
    /// Reads `BLUEBUBBLES_URL`, `BLUEBUBBLES_PASSWORD` and the optional
    /// `BLUEBUBBLES_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or the
    /// timeout is not a number.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BLUEBUBBLES_URL")
            .map_err(|_| Error::Config("BLUEBUBBLES_URL is not set".to_string()))?;
        let password = std::env::var("BLUEBUBBLES_PASSWORD")
            .map_err(|_| Error::Config("BLUEBUBBLES_PASSWORD is not set".to_string()))?;

        let timeout_secs = match std::env::var("BLUEBUBBLES_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("BLUEBUBBLES_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(&base_url, &password).with_timeout(Duration::from_secs(timeout_secs)))
    }

    /// Creates a configuration from explicit values.
    #[must_use]
    pub fn new(base_url: &str, password: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            password: SecretString::from(password),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the upstream request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = ServerConfig::new("http://localhost:1234///", "pw");
        assert_eq!(config.base_url, "http://localhost:1234");
    }

    #[test]
    fn test_default_timeout() {
        let config = ServerConfig::new("http://localhost:1234", "pw");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_with_timeout() {
        let config = ServerConfig::new("http://localhost:1234", "pw")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
