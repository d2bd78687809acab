//! HMAC-SHA256 token signing.
//!
//! Every signature covers the canonical string
//! `"TTF.<version>.<payload>"`, so tokens from a different format
//! version never verify. Output is unpadded base64url.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Wire-format protocol tag mixed into every signed message.
pub const PROTOCOL_TAG: &str = "TTF";

/// Keyed signer for token signatures.
#[derive(Clone)]
pub struct Signer {
    secret: Vec<u8>,
    version: u32,
}

impl Signer {
    pub fn new(secret: &[u8], version: u32) -> Self {
        Self {
            secret: secret.to_vec(),
            version,
        }
    }

    /// Sign `payload`, returning the unpadded base64url digest.
    pub fn sign(&self, payload: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::Crypto(format!("HMAC key: {e}")))?;
        mac.update(PROTOCOL_TAG.as_bytes());
        mac.update(b".");
        mac.update(self.version.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Recompute the signature for `payload` and compare it against
    /// `signature` in constant time.
    pub fn verify(&self, payload: &str, signature: &str) -> Result<bool, AuthError> {
        let expected = self.sign(payload)?;
        Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
    }
}
