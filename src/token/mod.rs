//! Session token minting and verification.
//!
//! A token is `payload + "." + base64url(HMAC-SHA-256(payload))` where
//! `payload` is `base64url(claims JSON)`: the MAC covers the encoded
//! segment. Signing uses a process-wide secret and there is no server-side
//! session state: any instance sharing the secret can verify a token minted
//! by any other.

pub mod claims;
pub mod codec;
pub mod service;
pub mod signer;

pub use claims::SessionClaims;
pub use codec::TokenCodec;
pub use service::SessionTokenService;
pub use signer::TokenSigner;
