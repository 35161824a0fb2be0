//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DOC_API_URL` - Base URL of the hosted document API
//! - `DOC_API_PROJECT` - Project identifier for the document API
//! - `DOC_API_KEY` - Server-side API key (validated for strength)
//! - `ADMIN_API_TOKEN` - Bearer token admins present to this service
//! - `ASSISTANT_API_URL` - Messages endpoint of the generation API
//! - `ASSISTANT_API_KEY` - Generation API key (validated for strength)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ASSISTANT_MODEL` - Model identifier (default: generator-large)
//! - `STATS_CACHE_PATH` - Persisted stats cache file (default: ./dashboard-cache.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use antenka_store::RestStoreConfig;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::assistant::AssistantConfig;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Hosted document API configuration
    pub doc_api: RestStoreConfig,
    /// Bearer token required on admin API routes
    pub admin_token: SecretString,
    /// Assistant upstream configuration
    pub assistant: AssistantConfig,
    /// Where the persisted stats cache lives
    pub stats_cache_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl AdminConfig {
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

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;

        let doc_api = RestStoreConfig {
            base_url: get_required_env("DOC_API_URL")?,
            project_id: get_required_env("DOC_API_PROJECT")?,
            api_key: get_validated_secret("DOC_API_KEY")?,
        };

        let admin_token = get_validated_secret("ADMIN_API_TOKEN")?;

        let assistant = AssistantConfig {
            endpoint: get_required_env("ASSISTANT_API_URL")?,
            api_key: get_validated_secret("ASSISTANT_API_KEY")?,
            model: get_env_or_default("ASSISTANT_MODEL", "generator-large"),
        };

        let stats_cache_path =
            PathBuf::from(get_env_or_default("STATS_CACHE_PATH", "dashboard-cache.json"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            doc_api,
            admin_token,
            assistant,
            stats_cache_path,
            sentry_dsn,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Compare a presented bearer token against the configured one.
#[must_use]
pub fn token_matches(presented: &str, expected: &SecretString) -> bool {
    let expected = expected.expose_secret();
    // Length leak is acceptable here; the panel is not internet-facing
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        let expected = SecretString::from("aB3xY9mK2nL5pQ7r");
        assert!(token_matches("aB3xY9mK2nL5pQ7r", &expected));
        assert!(!token_matches("aB3xY9mK2nL5pQ7s", &expected));
        assert!(!token_matches("short", &expected));
        assert!(!token_matches("", &expected));
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("changeme-token", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr_default_port() {
        let config = AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            doc_api: RestStoreConfig {
                base_url: "https://db.example.com".to_string(),
                project_id: "antenka-yume".to_string(),
                api_key: SecretString::from("k"),
            },
            admin_token: SecretString::from("t"),
            assistant: crate::assistant::AssistantConfig {
                endpoint: "https://api.example.com/v1/messages".to_string(),
                api_key: SecretString::from("k"),
                model: "generator-large".to_string(),
            },
            stats_cache_path: PathBuf::from("dashboard-cache.json"),
            sentry_dsn: None,
        };
        assert_eq!(config.socket_addr().port(), 3001);
    }
}
