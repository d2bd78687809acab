//! OTP replay protection.
//!
//! Each OTP code may be accepted at most once per secret. The store is
//! injected into the OTP engine so deployments can swap in a shared
//! backend (e.g. Redis) when validation runs on more than one process.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Store of consumed (secret, code) pairs.
pub trait ReplayStore: Send + Sync {
    /// Whether `code` is currently recorded as consumed for `secret`.
    fn contains(&self, secret: &str, code: &str) -> bool;

    /// Atomically record `code` as consumed for `secret` with the
    /// given retention, returning `false` if the pair was already
    /// present and unexpired.
    ///
    /// The check and the insert must happen under one critical
    /// section: two racing validations of the same code must not both
    /// observe "unused".
    fn try_consume(&self, secret: &str, code: &str, ttl: Duration) -> bool;
}

/// In-process replay store: a mutexed map with per-entry expiry.
///
/// Expired entries are pruned on every insert, so memory usage is
/// bounded by the number of codes accepted within one retention
/// window rather than growing for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryReplayStore {
    inner: Mutex<HashMap<(String, String), Instant>>,
}

impl InMemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayStore for InMemoryReplayStore {
    fn contains(&self, secret: &str, code: &str) -> bool {
        let now = Instant::now();
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&(secret.to_owned(), code.to_owned()))
            .is_some_and(|expires_at| *expires_at > now)
    }

    fn try_consume(&self, secret: &str, code: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        map.retain(|_, expires_at| *expires_at > now);

        let key = (secret.to_owned(), code.to_owned());
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, now + ttl);
        true
    }
}
