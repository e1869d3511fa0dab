//! Delegated credential backend: logins forwarded to the upstream.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{AdminProfile, CredentialStore, normalize_email};
use crate::error::GatewayError;
use crate::upstream::UpstreamClient;

/// Credential store that asks the upstream backend to verify the login.
///
/// The upstream owns the password check; this store maps its envelope to an
/// [`AdminProfile`] or to [`GatewayError::InvalidCredentials`].
pub struct DelegatedCredentialStore {
    upstream: Arc<UpstreamClient>,
}

impl DelegatedCredentialStore {
    /// Creates a store delegating to `upstream`.
    #[must_use]
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl CredentialStore for DelegatedCredentialStore {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminProfile, GatewayError> {
        let email = normalize_email(email);
        let body = json!({ "email": email, "password": password });

        // Transport failures propagate with their own taxonomy; only an
        // explicit ok:false from the upstream means the credentials were bad.
        let reply = self.upstream.forward("adminLogin", &body).await?;
        if !reply.is_ok_envelope() {
            debug!("upstream rejected login");
            return Err(GatewayError::InvalidCredentials);
        }

        let admin = reply
            .body
            .get("admin")
            .cloned()
            .ok_or(GatewayError::UpstreamMalformed {
                status: reply.status,
            })?;
        let mut profile: AdminProfile =
            serde_json::from_value(admin).map_err(|_| GatewayError::UpstreamMalformed {
                status: reply.status,
            })?;
        profile.email = normalize_email(&profile.email);
        Ok(profile)
    }
}
