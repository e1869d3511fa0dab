//! Payload segment codec: canonical JSON wrapped in url-safe base64.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::claims::SessionClaims;
use crate::error::GatewayError;

/// Stateless payload encoder/decoder.
pub struct TokenCodec;

impl TokenCodec {
    /// Encodes claims into a payload segment.
    ///
    /// Serialization is byte-stable for a given claims value, so the same
    /// claims always produce the same segment and therefore the same
    /// signature.
    pub fn encode(claims: &SessionClaims) -> Result<String, GatewayError> {
        let json = serde_json::to_vec(claims)
            .map_err(|e| GatewayError::Internal(anyhow::anyhow!("claims serialization: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes a payload segment back into claims.
    pub fn decode(segment: &str) -> Result<SessionClaims, GatewayError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment.as_bytes())
            .map_err(|_| GatewayError::TokenMalformed {
                reason: "payload is not valid base64url".to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|_| GatewayError::TokenMalformed {
            reason: "payload is not a valid claims object".to_string(),
        })
    }
}
