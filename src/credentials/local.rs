//! Allow-list credential backend with constant-time password checks.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::debug;

use super::{AdminProfile, CredentialStore, normalize_email};
use crate::error::GatewayError;

/// Stand-in compared against when the email is unknown, so that both
/// failure paths perform the same work.
const UNKNOWN_EMAIL_REFERENCE: &str = "no-such-admin-reference-password";

/// Credential store backed by the configured allow-list and password map.
pub struct LocalCredentialStore {
    profiles: HashMap<String, AdminProfile>,
    passwords: HashMap<String, SecretString>,
}

impl LocalCredentialStore {
    /// Builds a store from allow-list entries and a per-email password map.
    /// Emails on both sides are normalized on the way in.
    #[must_use]
    pub fn new(allowlist: Vec<AdminProfile>, passwords: HashMap<String, SecretString>) -> Self {
        let profiles = allowlist
            .into_iter()
            .map(|mut profile| {
                profile.email = normalize_email(&profile.email);
                (profile.email.clone(), profile)
            })
            .collect();
        let passwords = passwords
            .into_iter()
            .map(|(email, password)| (normalize_email(&email), password))
            .collect();
        Self { profiles, passwords }
    }
}

#[async_trait]
impl CredentialStore for LocalCredentialStore {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminProfile, GatewayError> {
        let email = normalize_email(email);
        let profile = self.profiles.get(&email);
        let expected = self.passwords.get(&email);

        let reference = expected
            .map(|secret| secret.expose_secret())
            .unwrap_or(UNKNOWN_EMAIL_REFERENCE);
        let password_matches = constant_time_str_eq(reference, password);

        match (profile, expected) {
            (Some(profile), Some(_)) if password_matches => Ok(profile.clone()),
            _ => {
                debug!(known_email = profile.is_some(), "local login rejected");
                Err(GatewayError::InvalidCredentials)
            }
        }
    }
}

/// Constant-time string equality. `ct_eq` requires equal-length slices, so
/// the length check gates it.
fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LocalCredentialStore {
        let allowlist = vec![
            AdminProfile {
                email: "tara@smartfits.co.uk".to_string(),
                display_name: "Tara Hassall".to_string(),
                can_view_logs: true,
            },
            AdminProfile {
                email: "charlie@smartfits.co.uk".to_string(),
                display_name: "Charlie Inger".to_string(),
                can_view_logs: false,
            },
        ];
        let mut passwords = HashMap::new();
        passwords.insert(
            "tara@smartfits.co.uk".to_string(),
            SecretString::from("correct horse battery staple".to_string()),
        );
        passwords.insert(
            "charlie@smartfits.co.uk".to_string(),
            SecretString::from("another strong password".to_string()),
        );
        LocalCredentialStore::new(allowlist, passwords)
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let profile = store()
            .authenticate("tara@smartfits.co.uk", "correct horse battery staple")
            .await
            .unwrap();
        assert_eq!(profile.display_name, "Tara Hassall");
        assert!(profile.can_view_logs);
    }

    #[tokio::test]
    async fn test_authenticate_normalizes_email() {
        let profile = store()
            .authenticate("  TARA@SmartFits.CO.UK ", "correct horse battery staple")
            .await
            .unwrap();
        assert_eq!(profile.email, "tara@smartfits.co.uk");
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_identical() {
        let store = store();
        let unknown = store
            .authenticate("nobody@smartfits.co.uk", "anything")
            .await
            .unwrap_err();
        let wrong = store
            .authenticate("tara@smartfits.co.uk", "wrongpassword")
            .await
            .unwrap_err();
        assert!(matches!(unknown, GatewayError::InvalidCredentials));
        assert!(matches!(wrong, GatewayError::InvalidCredentials));
        assert_eq!(unknown.public_message(), wrong.public_message());
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_profile_without_password_entry_is_rejected() {
        let allowlist = vec![AdminProfile {
            email: "emma@smartfits.co.uk".to_string(),
            display_name: "Emma Sumner".to_string(),
            can_view_logs: false,
        }];
        let store = LocalCredentialStore::new(allowlist, HashMap::new());
        let err = store
            .authenticate("emma@smartfits.co.uk", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredentials));
    }

    #[test]
    fn test_constant_time_str_eq() {
        assert!(constant_time_str_eq("abc", "abc"));
        assert!(!constant_time_str_eq("abc", "abd"));
        assert!(!constant_time_str_eq("abc", "abcd"));
        assert!(constant_time_str_eq("", ""));
    }
}
