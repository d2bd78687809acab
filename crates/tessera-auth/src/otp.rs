//! HOTP/TOTP one-time password engine.
//!
//! HOTP follows RFC 4226 exactly (8-byte big-endian counter,
//! HMAC-SHA1, dynamic truncation) so codes interoperate with standard
//! authenticator apps. TOTP is HOTP at counter
//! `floor(unix_time / step)` with a 30-second step and no skew window.
//!
//! Accepted codes are recorded in the injected [`ReplayStore`]; a code
//! is accepted at most once per secret within its retention window.

use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use subtle::ConstantTimeEq;
use urlencoding::encode as url_encode;

use crate::base32;
use crate::config::Config;
use crate::error::AuthError;
use crate::replay::ReplayStore;

type HmacSha1 = Hmac<Sha1>;

/// Which OTP scheme a provisioning URI enrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Totp,
    Hotp,
}

impl SecretKind {
    fn uri_scheme(self) -> &'static str {
        match self {
            SecretKind::Totp => "totp",
            SecretKind::Hotp => "hotp",
        }
    }
}

/// A freshly generated OTP secret.
///
/// The Base32 form is what the account holder enrolls (QR code or
/// manual entry); this core never stores it.
#[derive(Debug, Clone)]
pub struct OtpSecret {
    /// Raw random key bytes.
    pub bytes: Vec<u8>,
    /// Unpadded Base32 encoding of `bytes`.
    pub base32: String,
    /// `otpauth://` enrollment URI for authenticator apps.
    pub provisioning_uri: String,
}

/// OTP code generation and single-use validation.
pub struct OtpEngine<R: ReplayStore> {
    replay: R,
    digits: u32,
    step_secs: u64,
    secret_len: usize,
    replay_ttl: Duration,
    issuer: Option<String>,
}

impl<R: ReplayStore> OtpEngine<R> {
    pub fn new(replay: R, config: &Config) -> Self {
        Self {
            replay,
            digits: config.otp_digits,
            step_secs: config.totp_step_secs,
            secret_len: config.otp_secret_len,
            replay_ttl: Duration::from_secs(config.replay_ttl_secs),
            issuer: config.otp_issuer.clone(),
        }
    }

    /// Generate a fresh OTP secret plus its provisioning URI.
    ///
    /// `name` is the account label shown in the authenticator app;
    /// both it and the configured issuer are query-escaped.
    pub fn generate_secret(&self, name: &str, kind: SecretKind) -> OtpSecret {
        let mut bytes = vec![0u8; self.secret_len];
        rand::rng().fill_bytes(&mut bytes);
        let encoded = base32::encode(&bytes);

        let mut uri = format!(
            "otpauth://{}/{}?secret={}",
            kind.uri_scheme(),
            url_encode(name),
            encoded,
        );
        if let Some(issuer) = &self.issuer {
            uri.push_str("&issuer=");
            uri.push_str(&url_encode(issuer));
        }

        OtpSecret {
            bytes,
            base32: encoded,
            provisioning_uri: uri,
        }
    }

    /// Compute the RFC 4226 HOTP code for `counter`.
    pub fn hotp(&self, secret_base32: &str, counter: u64) -> Result<String, AuthError> {
        let key = base32::decode(secret_base32)?;
        let mut mac = HmacSha1::new_from_slice(&key)
            .map_err(|e| AuthError::Crypto(format!("HMAC key: {e}")))?;
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        // Dynamic truncation: low nibble of the last byte selects a
        // 31-bit big-endian word inside the digest.
        let offset = (digest[19] & 0xf) as usize;
        let binary = (u32::from(digest[offset] & 0x7f) << 24)
            | (u32::from(digest[offset + 1]) << 16)
            | (u32::from(digest[offset + 2]) << 8)
            | u32::from(digest[offset + 3]);

        let code = binary % 10u32.pow(self.digits);
        Ok(format!("{code:0width$}", width = self.digits as usize))
    }

    /// Validate an HOTP code at `counter`, consuming it on success.
    ///
    /// Format errors, mismatches and replays are indistinguishable at
    /// this boundary; see [`check_hotp`](Self::check_hotp) for the
    /// typed result.
    pub fn validate_hotp(&self, code: &str, secret_base32: &str, counter: u64) -> bool {
        match self.check_hotp(code, secret_base32, counter) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(%reason, "OTP code rejected");
                false
            }
        }
    }

    /// Validate a TOTP code against the current time step.
    pub fn validate_totp(&self, code: &str, secret_base32: &str) -> bool {
        self.validate_totp_at(code, secret_base32, unix_now())
    }

    /// Validate a TOTP code as of `unix_secs`.
    pub fn validate_totp_at(&self, code: &str, secret_base32: &str, unix_secs: u64) -> bool {
        match self.check_totp_at(code, secret_base32, unix_secs) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(%reason, "TOTP code rejected");
                false
            }
        }
    }

    /// Typed HOTP validation, used by tests and by callers that log
    /// rejection reasons.
    pub fn check_hotp(
        &self,
        code: &str,
        secret_base32: &str,
        counter: u64,
    ) -> Result<(), AuthError> {
        self.check_hotp_with_ttl(code, secret_base32, counter, self.replay_ttl)
    }

    /// Typed TOTP validation against the current time step.
    pub fn check_totp(&self, code: &str, secret_base32: &str) -> Result<(), AuthError> {
        self.check_totp_at(code, secret_base32, unix_now())
    }

    /// Typed TOTP validation as of `unix_secs`.
    pub fn check_totp_at(
        &self,
        code: &str,
        secret_base32: &str,
        unix_secs: u64,
    ) -> Result<(), AuthError> {
        let counter = unix_secs / self.step_secs;
        // Retain the code one full step past the end of its window.
        let ttl = Duration::from_secs(2 * self.step_secs - unix_secs % self.step_secs);
        self.check_hotp_with_ttl(code, secret_base32, counter, ttl)
    }

    fn check_hotp_with_ttl(
        &self,
        code: &str,
        secret_base32: &str,
        counter: u64,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        if secret_base32.is_empty()
            || code.len() != self.digits as usize
            || !code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AuthError::InvalidOtpFormat);
        }

        // A consumed code stays rejected for its secret no matter
        // which counter is being checked.
        if self.replay.contains(secret_base32, code) {
            return Err(AuthError::OtpReplay);
        }

        let expected = self.hotp(secret_base32, counter)?;
        let matches: bool = expected.as_bytes().ct_eq(code.as_bytes()).into();
        if !matches {
            return Err(AuthError::OtpMismatch);
        }

        // Record only codes that actually verified; the store call is
        // the atomic check-then-insert.
        if !self.replay.try_consume(secret_base32, code, ttl) {
            return Err(AuthError::OtpReplay);
        }
        Ok(())
    }
}

fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
