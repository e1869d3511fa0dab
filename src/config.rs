//! Type-Safe Configuration with Validation
//!
//! Provides type-safe configuration with URL validation and environment variable support.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::credentials::AdminProfile;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Name of the offending variable
        field: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Invalid port number
    #[error("Invalid port: must be between 1 and 65535")]
    InvalidPort,

    /// Invalid TTL value
    #[error("Invalid TTL: must be greater than 0")]
    InvalidTtl,

    /// Invalid timeout value
    #[error("Invalid timeout: must be greater than 0")]
    InvalidTimeout,

    /// Signing secret is too short to be safe
    #[error("TOKEN_SECRET must be at least 32 bytes")]
    WeakSecret,

    /// Unknown credential backend name
    #[error("Unknown credential backend: {0} (expected \"delegated\" or \"local\")")]
    UnknownBackend(String),

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Name of the offending variable
        name: String,
        /// Parser diagnostic
        reason: String,
    },
}

/// Minimum accepted length for the token signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Which backend answers admin login requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialBackend {
    /// Forward the login to the upstream `adminLogin` action.
    Delegated,
    /// Verify against the configured allow-list and password map.
    Local,
}

impl FromStr for CredentialBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("delegated") {
            Ok(Self::Delegated)
        } else if s.eq_ignore_ascii_case("local") {
            Ok(Self::Local)
        } else {
            Err(format!("unknown backend {s:?}"))
        }
    }
}

/// Service configuration with validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port (1-65535)
    pub port: u16,
    /// Upstream backend URL that receives proxied actions
    pub upstream_url: Url,
    /// Upstream call timeout in seconds
    pub upstream_timeout_secs: u64,
    /// HMAC signing secret for session tokens
    pub token_secret: SecretString,
    /// Session token TTL in seconds (must be > 0; default 7 days)
    pub token_ttl_seconds: i64,
    /// Which backend answers admin logins
    pub credential_backend: CredentialBackend,
    /// Admin allow-list for the local backend
    pub admin_allowlist: Vec<AdminProfile>,
    /// Per-email password map for the local backend
    pub admin_passwords: HashMap<String, SecretString>,
    /// Allowed CORS origin, `*` for any
    pub allowed_origin: String,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let token_secret = env::var("TOKEN_SECRET")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingRequired("TOKEN_SECRET".to_string()))?;

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 8080)?,
            upstream_url: parse_required_url_env("UPSTREAM_URL")?,
            upstream_timeout_secs: parse_env("UPSTREAM_TIMEOUT_SECS", 10)?,
            token_secret,
            token_ttl_seconds: parse_env("TOKEN_TTL_SECONDS", 604_800)?,
            credential_backend: parse_backend_env("CREDENTIAL_BACKEND")?,
            admin_allowlist: parse_json_env("ADMIN_ALLOWLIST_JSON")?,
            admin_passwords: parse_json_env("ADMIN_PASSWORDS_JSON")?,
            allowed_origin: env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.token_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidTtl);
        }
        if self.token_secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }
        if self.upstream_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.allowed_origin != "*" {
            Url::parse(&self.allowed_origin).map_err(|e| ConfigError::InvalidUrl {
                field: "ALLOWED_ORIGIN".to_string(),
                reason: e.to_string(),
            })?;
        }
        if self.credential_backend == CredentialBackend::Local {
            if self.admin_allowlist.is_empty() {
                return Err(ConfigError::MissingRequired(
                    "ADMIN_ALLOWLIST_JSON".to_string(),
                ));
            }
            if self.admin_passwords.is_empty() {
                return Err(ConfigError::MissingRequired(
                    "ADMIN_PASSWORDS_JSON".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Gets the upstream URL as a string.
    #[must_use]
    pub fn upstream_url_str(&self) -> &str {
        self.upstream_url.as_str()
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse the credential backend selector, defaulting to delegated.
fn parse_backend_env(name: &str) -> Result<CredentialBackend, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::UnknownBackend(raw)),
        Err(_) => Ok(CredentialBackend::Delegated),
    }
}

/// Parse a required URL environment variable.
fn parse_required_url_env(name: &str) -> Result<Url, ConfigError> {
    let url_str =
        env::var(name).map_err(|_| ConfigError::MissingRequired(name.to_string()))?;
    Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a JSON-valued environment variable, defaulting when unset or blank.
fn parse_json_env<T>(name: &str) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
                name: name.to_string(),
                reason: e.to_string(),
            })
        }
        _ => Ok(T::default()),
    }
}
