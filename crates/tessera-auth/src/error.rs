//! Token and OTP validation error types.
//!
//! Public entry points collapse these to `Option`/`bool` so callers
//! cannot be used as a rejection-reason oracle; the typed variants stay
//! available through the `try_*` forms for logging and tests.

use tessera_core::error::TesseraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("invalid base32 encoding")]
    InvalidEncoding,

    #[error("malformed OTP code or secret")]
    InvalidOtpFormat,

    #[error("OTP code already consumed")]
    OtpReplay,

    #[error("OTP code mismatch")]
    OtpMismatch,

    #[error("token issued before the account's validity watermark")]
    AccountInvalidated,

    #[error("token MFA state does not match the account")]
    MfaStateMismatch,

    #[error("invalid token prefix: {0}")]
    InvalidPrefix(String),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Account(#[from] TesseraError),
}

impl From<AuthError> for TesseraError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Account(inner) => inner,
            AuthError::Crypto(msg) => TesseraError::Crypto(msg),
            other => TesseraError::AuthenticationFailed {
                reason: other.to_string(),
            },
        }
    }
}
