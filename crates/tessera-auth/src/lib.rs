//! Tessera Auth — stateless bearer token issuance/validation with an
//! HOTP/TOTP MFA upgrade path.
//!
//! Tokens bind an account id and an issue time under an HMAC-SHA256
//! signature. Accounts are resolved through the caller-supplied
//! [`tessera_core::AccountFetcher`] capability; this crate owns no
//! storage beyond the OTP replay store.

pub mod base32;
pub mod config;
pub mod error;
pub mod otp;
pub mod replay;
pub mod service;
pub mod signer;
pub mod token;

pub use config::Config;
pub use error::AuthError;
pub use otp::{OtpEngine, OtpSecret, SecretKind};
pub use replay::{InMemoryReplayStore, ReplayStore};
pub use service::TokenService;
pub use token::Token;
