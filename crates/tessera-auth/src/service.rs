//! Token service — issuance, MFA upgrade and validation.

use chrono::Utc;
use tessera_core::account::{Account, AccountFetcher};

use crate::config::Config;
use crate::error::AuthError;
use crate::otp::OtpEngine;
use crate::replay::{InMemoryReplayStore, ReplayStore};
use crate::signer::Signer;
use crate::token::{TOKEN_EPOCH_MILLIS, Token};

/// Stateless bearer token service.
///
/// Generic over the replay store so deployments can share OTP replay
/// state across processes; the default is the in-process store.
pub struct TokenService<R: ReplayStore = InMemoryReplayStore> {
    signer: Signer,
    otp: OtpEngine<R>,
}

impl TokenService<InMemoryReplayStore> {
    pub fn new(config: Config) -> Self {
        Self::with_replay_store(config, InMemoryReplayStore::new())
    }
}

impl<R: ReplayStore> TokenService<R> {
    pub fn with_replay_store(config: Config, replay: R) -> Self {
        Self {
            signer: Signer::new(config.secret.as_bytes(), config.version),
            otp: OtpEngine::new(replay, &config),
        }
    }

    /// The OTP engine, for secret enrollment and standalone code
    /// validation.
    pub fn otp(&self) -> &OtpEngine<R> {
        &self.otp
    }

    /// Issue a fresh non-MFA token for `account_id`.
    pub fn generate(&self, account_id: &str) -> Result<String, AuthError> {
        self.sign_token(&Token::new(account_id, self.current_token_time()))
    }

    /// Issue a token carrying a free-form prefix (e.g. `bot`).
    ///
    /// The prefix must not contain dots and cannot be `mfa` — MFA
    /// tokens only come out of [`upgrade`](Self::upgrade).
    pub fn generate_prefixed(&self, account_id: &str, prefix: &str) -> Result<String, AuthError> {
        let token = Token::new(account_id, self.current_token_time()).with_prefix(prefix)?;
        if token.is_mfa() {
            return Err(AuthError::InvalidPrefix(prefix.to_owned()));
        }
        self.sign_token(&token)
    }

    /// Upgrade a non-MFA token into an MFA token.
    ///
    /// `counter: None` validates `code` as TOTP; `Some(n)` as HOTP at
    /// counter `n`. Returns `None` on any failure — the original
    /// token is untouched and stays valid as a non-MFA token.
    pub fn upgrade(
        &self,
        token: &str,
        code: &str,
        secret_base32: &str,
        counter: Option<u64>,
    ) -> Option<String> {
        match self.try_upgrade(token, code, secret_base32, counter) {
            Ok(upgraded) => Some(upgraded),
            Err(reason) => {
                tracing::debug!(%reason, "token upgrade rejected");
                None
            }
        }
    }

    /// Typed variant of [`upgrade`](Self::upgrade) for callers that
    /// log rejection reasons.
    pub fn try_upgrade(
        &self,
        token: &str,
        code: &str,
        secret_base32: &str,
        counter: Option<u64>,
    ) -> Result<String, AuthError> {
        // 1. Parse; already-MFA tokens have nothing to upgrade to.
        let parsed = Token::parse(token)?;
        if parsed.token.is_mfa() {
            return Err(AuthError::MfaStateMismatch);
        }

        // 2. Never re-sign segments we didn't sign ourselves.
        if !self.signer.verify(&parsed.message, &parsed.signature)? {
            return Err(AuthError::InvalidSignature);
        }

        // 3. One-time code check.
        match counter {
            Some(counter) => self.otp.check_hotp(code, secret_base32, counter)?,
            None => self.otp.check_totp(code, secret_base32)?,
        }

        // 4. Re-sign the same account/time segments under the mfa
        //    marker, binding the MFA assertion into the signature.
        self.sign_token(&parsed.token.into_mfa())
    }

    /// Validate a token and resolve its account.
    ///
    /// With `ignore_mfa` set, only non-MFA tokens are accepted
    /// regardless of the account's MFA requirement — useful for
    /// "ticket" tokens while an MFA challenge is pending. Returns
    /// `None` on any rejection without distinguishing the cause.
    pub async fn validate<F: AccountFetcher>(
        &self,
        token: &str,
        fetcher: &F,
        ignore_mfa: bool,
    ) -> Option<F::Account> {
        match self.try_validate(token, fetcher, ignore_mfa).await {
            Ok(account) => Some(account),
            Err(reason) => {
                tracing::debug!(%reason, "token rejected");
                None
            }
        }
    }

    /// Typed variant of [`validate`](Self::validate) for callers that
    /// log rejection reasons.
    pub async fn try_validate<F: AccountFetcher>(
        &self,
        token: &str,
        fetcher: &F,
        ignore_mfa: bool,
    ) -> Result<F::Account, AuthError> {
        // 1. Structural parse.
        let parsed = Token::parse(token)?;

        // 2. Signature check before any account lookup — the fetcher
        //    must never run for forged or malformed tokens.
        if !self.signer.verify(&parsed.message, &parsed.signature)? {
            return Err(AuthError::InvalidSignature);
        }

        // 3. Resolve the account.
        let account = fetcher.fetch(parsed.token.account_id()).await?;

        // 4. The token must be strictly newer than the account's
        //    invalidation watermark.
        if parsed.token.issue_time() <= account.tokens_valid_since() {
            return Err(AuthError::AccountInvalidated);
        }

        // 5. MFA agreement.
        let mfa_ok = if ignore_mfa {
            !parsed.token.is_mfa()
        } else {
            parsed.token.is_mfa() == account.has_mfa()
        };
        if !mfa_ok {
            return Err(AuthError::MfaStateMismatch);
        }

        Ok(account)
    }

    /// Seconds elapsed since the token epoch (2019-01-01T00:00:00Z).
    pub fn current_token_time(&self) -> i64 {
        (Utc::now().timestamp_millis() - TOKEN_EPOCH_MILLIS) / 1000
    }

    fn sign_token(&self, token: &Token) -> Result<String, AuthError> {
        let message = token.message();
        let signature = self.signer.sign(&message)?;
        Ok(format!("{message}.{signature}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(Config {
            secret: "unit-test-secret".into(),
            ..Config::default()
        })
    }

    #[test]
    fn generated_token_has_three_segments() {
        let token = service().generate("acct-1").unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));
    }

    #[test]
    fn generate_prefixed_carries_prefix() {
        let svc = service();
        let token = svc.generate_prefixed("acct-1", "bot").unwrap();
        assert!(token.starts_with("bot."));
        assert_eq!(token.split('.').count(), 4);
    }

    #[test]
    fn generate_prefixed_rejects_mfa_and_dots() {
        let svc = service();
        assert!(matches!(
            svc.generate_prefixed("acct-1", "mfa"),
            Err(AuthError::InvalidPrefix(_))
        ));
        assert!(matches!(
            svc.generate_prefixed("acct-1", "a.b"),
            Err(AuthError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn current_token_time_is_positive_and_epoch_shifted() {
        let now = service().current_token_time();
        // 2019-01-01 is in the past; a token time is far smaller than
        // the raw Unix time.
        assert!(now > 0);
        assert!(now < Utc::now().timestamp());
    }
}
