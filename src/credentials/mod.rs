//! Credential verification backends behind one interface.
//!
//! Two strategies exist: `delegated` forwards the login to the upstream
//! backend's own `adminLogin` action, `local` verifies against a configured
//! allow-list and password map. The gateway is indifferent to which one is
//! active.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Config, CredentialBackend};
use crate::error::GatewayError;
use crate::upstream::UpstreamClient;

pub mod delegated;
pub mod local;

pub use delegated::DelegatedCredentialStore;
pub use local::LocalCredentialStore;

/// An authenticated administrator as the upstream knows them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminProfile {
    /// Email address, the case-insensitive identity key.
    pub email: String,
    /// Display name shown by admin tooling.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Whether this admin may read audit logs.
    #[serde(rename = "canViewLogs", default)]
    pub can_view_logs: bool,
}

/// Verifies admin credentials and yields the matching profile.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Authenticates `email` and `password`.
    ///
    /// Unknown email and wrong password are indistinguishable: both fail
    /// with [`GatewayError::InvalidCredentials`]. Upstream transport
    /// failures keep their own taxonomy and are never reported as bad
    /// credentials.
    async fn authenticate(&self, email: &str, password: &str)
    -> Result<AdminProfile, GatewayError>;
}

/// Lowercases and trims an email for use as the identity key.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Builds the credential store the configuration selects.
#[must_use]
pub fn from_config(config: &Config, upstream: Arc<UpstreamClient>) -> Arc<dyn CredentialStore> {
    match config.credential_backend {
        CredentialBackend::Delegated => Arc::new(DelegatedCredentialStore::new(upstream)),
        CredentialBackend::Local => Arc::new(LocalCredentialStore::new(
            config.admin_allowlist.clone(),
            config.admin_passwords.clone(),
        )),
    }
}
