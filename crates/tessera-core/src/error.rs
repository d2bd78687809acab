//! Error types for the Tessera system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("Account not found: {id}")]
    AccountNotFound { id: String },

    #[error("Account lookup failed: {0}")]
    AccountLookup(String),

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TesseraResult<T> = Result<T, TesseraError>;
