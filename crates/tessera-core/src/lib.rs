//! Tessera Core — domain types and capability traits shared across the
//! Tessera token system.

pub mod account;
pub mod error;

pub use account::{Account, AccountFetcher, SimpleAccount};
pub use error::{TesseraError, TesseraResult};
