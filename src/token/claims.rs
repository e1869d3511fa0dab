//! Claims carried inside the signed token payload.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::AdminProfile;

/// Session claims embedded in a token.
///
/// Field order here is the canonical serialization order, so encoding the
/// same claims twice yields identical payload bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Normalized admin email, the identity key.
    pub email: String,
    /// Display name shown by admin tooling.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Whether the holder may read audit logs.
    #[serde(rename = "canViewLogs")]
    pub can_view_logs: bool,
    /// Unix seconds when the token was minted.
    pub iat: i64,
    /// Unix seconds after which the token no longer verifies.
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims for `profile` valid for `ttl_seconds` from now.
    ///
    /// A negative TTL produces claims that are already expired, which tests
    /// rely on. The expiry saturates at the i64 bounds rather than wrapping.
    pub fn new(profile: &AdminProfile, ttl_seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        SessionClaims {
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            can_view_logs: profile.can_view_logs,
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        }
    }

    /// Checks whether the claims are expired right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Expiry instant; falls back to the epoch for out-of-range values.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// The profile these claims were minted from.
    #[must_use]
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            can_view_logs: self.can_view_logs,
        }
    }
}
