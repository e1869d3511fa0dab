//! HMAC-SHA-256 signing over payload segments.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Raw length of an HMAC-SHA-256 signature.
const SIGNATURE_LEN: usize = 32;

/// Signs and verifies payload segments with a shared secret.
///
/// The secret stays wrapped in a [`SecretString`] and is only exposed to the
/// MAC construction.
pub struct TokenSigner {
    secret: SecretString,
}

impl TokenSigner {
    /// Creates a signer over `secret`.
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Signs `message` and returns the base64url signature segment.
    pub fn sign(&self, message: &str) -> Result<String, GatewayError> {
        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Verifies `signature_segment` against `message`.
    ///
    /// Comparison is constant-time over the decoded bytes. Undecodable or
    /// wrong-length signatures verify false rather than erroring, so callers
    /// treat them uniformly with wrong signatures.
    pub fn verify(&self, message: &str, signature_segment: &str) -> Result<bool, GatewayError> {
        let presented = match URL_SAFE_NO_PAD.decode(signature_segment.as_bytes()) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(false),
        };
        if presented.len() != SIGNATURE_LEN {
            return Ok(false);
        }
        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        let expected = mac.finalize().into_bytes();
        Ok(bool::from(expected.as_slice().ct_eq(&presented)))
    }

    fn mac(&self) -> Result<HmacSha256, GatewayError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| GatewayError::Internal(anyhow::anyhow!("HMAC key rejected")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(SecretString::from(
            "unit-test-secret-0123456789abcdef0123456789".to_string(),
        ))
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = signer();
        assert_eq!(
            signer.sign("payload").unwrap(),
            signer.sign("payload").unwrap()
        );
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let signer = signer();
        let sig = signer.sign("payload").unwrap();
        assert!(signer.verify("payload", &sig).unwrap());
    }

    #[test]
    fn test_verify_rejects_other_message() {
        let signer = signer();
        let sig = signer.sign("payload").unwrap();
        assert!(!signer.verify("Payload", &sig).unwrap());
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let sig = signer().sign("payload").unwrap();
        let other = TokenSigner::new(SecretString::from(
            "a-completely-different-secret-0123456789ab".to_string(),
        ));
        assert!(!other.verify("payload", &sig).unwrap());
    }

    #[test]
    fn test_verify_rejects_undecodable_signature() {
        assert!(!signer().verify("payload", "!!!not-base64!!!").unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_length_signature() {
        let short = URL_SAFE_NO_PAD.encode(b"short");
        assert!(!signer().verify("payload", &short).unwrap());
    }

    #[test]
    fn test_signature_segment_is_43_chars() {
        // 32 bytes in unpadded base64url
        let sig = signer().sign("payload").unwrap();
        assert_eq!(sig.len(), 43);
    }
}
