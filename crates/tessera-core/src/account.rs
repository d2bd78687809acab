//! Account capability traits.
//!
//! The token core never owns account storage. Callers supply an
//! [`AccountFetcher`] that resolves an account id to a record exposing
//! the two fields token validation needs: the invalidation watermark
//! and the MFA requirement. All fetches are async; synchronous callers
//! simply return a ready future.

use serde::{Deserialize, Serialize};

use crate::error::TesseraResult;

/// Minimal view of an account record as seen by token validation.
///
/// `tokens_valid_since` is expressed in seconds since the token epoch
/// (2019-01-01T00:00:00Z) — the same unit as a token's issue time.
/// Bumping it invalidates every token issued at or before that instant.
pub trait Account {
    /// Opaque account identifier embedded in tokens.
    fn id(&self) -> &str;

    /// Watermark (token-epoch seconds) before which tokens are rejected.
    fn tokens_valid_since(&self) -> i64;

    /// Whether this account requires MFA-marked tokens.
    fn has_mfa(&self) -> bool;
}

/// Caller-supplied account lookup capability.
///
/// Implementations may hit a database, a cache, or an in-memory map —
/// the token service always awaits the returned future and never
/// retries or times out on its own.
pub trait AccountFetcher: Send + Sync {
    type Account: Account + Send;

    fn fetch(&self, account_id: &str) -> impl Future<Output = TesseraResult<Self::Account>> + Send;
}

/// Plain account record for callers that don't have their own model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleAccount {
    pub id: String,
    pub tokens_valid_since: i64,
    pub has_mfa: bool,
}

impl Account for SimpleAccount {
    fn id(&self) -> &str {
        &self.id
    }

    fn tokens_valid_since(&self) -> i64 {
        self.tokens_valid_since
    }

    fn has_mfa(&self) -> bool {
        self.has_mfa
    }
}
