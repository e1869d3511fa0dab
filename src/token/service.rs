//! Mint/verify composition over the codec and signer.
//!
//! The MAC input is the encoded payload segment exactly as transmitted,
//! not the claims JSON it decodes to.

use secrecy::SecretString;

use super::claims::SessionClaims;
use super::codec::TokenCodec;
use super::signer::TokenSigner;
use crate::credentials::AdminProfile;
use crate::error::GatewayError;

/// Maximum accepted token length in bytes, applied before any parsing.
///
/// Real tokens are around 300 bytes; this bounds adversarial input without
/// ever rejecting a legitimate one.
const MAX_TOKEN_LEN: usize = 4096;

/// Stateless session token service.
///
/// Holds the signing secret and default TTL; minting and verification share
/// no other state, so one instance serves all requests.
pub struct SessionTokenService {
    signer: TokenSigner,
    ttl_seconds: i64,
}

impl SessionTokenService {
    /// Creates a service signing with `secret`, minting tokens valid for
    /// `ttl_seconds`.
    #[must_use]
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Self {
        Self {
            signer: TokenSigner::new(secret),
            ttl_seconds,
        }
    }

    /// Mints a signed token for `profile` with the configured TTL.
    pub fn mint(&self, profile: &AdminProfile) -> Result<String, GatewayError> {
        self.mint_with_ttl(profile, self.ttl_seconds)
    }

    /// Mints with an explicit TTL.
    ///
    /// Negative TTLs are permitted and produce already-expired tokens, which
    /// the expiry tests use.
    pub fn mint_with_ttl(
        &self,
        profile: &AdminProfile,
        ttl_seconds: i64,
    ) -> Result<String, GatewayError> {
        let claims = SessionClaims::new(profile, ttl_seconds);
        let payload = TokenCodec::encode(&claims)?;
        let signature = self.signer.sign(&payload)?;
        Ok(format!("{payload}.{signature}"))
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Check order: length cap, segment shape, signature, payload decode,
    /// expiry. The distinct failure variants feed logs and tests; the HTTP
    /// layer collapses them all to one generic message.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, GatewayError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(GatewayError::TokenMalformed {
                reason: "token exceeds maximum length".to_string(),
            });
        }
        let (payload, signature) = split_segments(token)?;
        if !self.signer.verify(payload, signature)? {
            return Err(GatewayError::BadSignature);
        }
        let claims = TokenCodec::decode(payload)?;
        if claims.is_expired() {
            return Err(GatewayError::TokenExpired {
                expired_at: claims.expires_at(),
            });
        }
        Ok(claims)
    }
}

/// Splits a token into exactly two non-empty dot-separated segments.
fn split_segments(token: &str) -> Result<(&str, &str), GatewayError> {
    let mut parts = token.split('.');
    let payload = parts.next().unwrap_or_default();
    let signature = parts.next().unwrap_or_default();
    if payload.is_empty() || signature.is_empty() || parts.next().is_some() {
        return Err(GatewayError::TokenMalformed {
            reason: "expected exactly two dot-separated segments".to_string(),
        });
    }
    Ok((payload, signature))
}
