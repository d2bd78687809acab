//! Token wire format.
//!
//! A token is `["mfa."] b64url(account_id) "." b64url(issue_time) "."
//! signature`, all segments unpadded base64url. The issue time is a
//! decimal string of seconds since the token epoch
//! (2019-01-01T00:00:00Z), which keeps tokens short. The signature
//! always covers the literal prefix that is present.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::AuthError;

/// First millisecond of 2019, the token epoch.
pub const TOKEN_EPOCH_MILLIS: i64 = 1_546_300_800_000;

/// Prefix marking a token as MFA-upgraded.
pub const MFA_PREFIX: &str = "mfa";

/// An unsigned token: account id, issue time and optional prefix.
///
/// The `mfa` prefix is the one prefix with validation semantics;
/// other prefixes (e.g. `bot`) pass through [`Token::message`]
/// untouched and are covered by the signature like any other part of
/// the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    account_id: String,
    issue_time: i64,
    prefix: Option<String>,
}

impl Token {
    pub fn new(account_id: impl Into<String>, issue_time: i64) -> Self {
        Self {
            account_id: account_id.into(),
            issue_time,
            prefix: None,
        }
    }

    /// Attach a prefix. Fails if the prefix is empty or contains a
    /// dot, which would break segment splitting.
    pub fn with_prefix(mut self, prefix: &str) -> Result<Self, AuthError> {
        if prefix.is_empty() || prefix.contains('.') {
            return Err(AuthError::InvalidPrefix(prefix.to_owned()));
        }
        self.prefix = Some(prefix.to_owned());
        Ok(self)
    }

    /// Mark this token as MFA-upgraded.
    pub fn into_mfa(mut self) -> Self {
        self.prefix = Some(MFA_PREFIX.to_owned());
        self
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Issue time in seconds since the token epoch.
    pub fn issue_time(&self) -> i64 {
        self.issue_time
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn is_mfa(&self) -> bool {
        self.prefix.as_deref() == Some(MFA_PREFIX)
    }

    /// The message a signature covers: `[prefix.]account.time` with
    /// both segments base64url-encoded.
    pub fn message(&self) -> String {
        let account = URL_SAFE_NO_PAD.encode(self.account_id.as_bytes());
        let time = URL_SAFE_NO_PAD.encode(self.issue_time.to_string().as_bytes());
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{account}.{time}"),
            None => format!("{account}.{time}"),
        }
    }

    /// Parse token text into its fields plus the signed message and
    /// the carried signature. No signature verification happens here.
    ///
    /// Only the `mfa.` marker is recognized while parsing; a token
    /// with any other prefix does not split into three segments and
    /// is rejected as malformed, matching validation semantics.
    pub fn parse(text: &str) -> Result<ParsedToken, AuthError> {
        let (is_mfa, rest) = match text.strip_prefix("mfa.") {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let segments: Vec<&str> = rest.split('.').collect();
        let &[account_seg, time_seg, signature] = segments.as_slice() else {
            return Err(AuthError::MalformedToken);
        };

        let account_id = decode_segment(account_seg)?;
        let issue_time: i64 = decode_segment(time_seg)?
            .parse()
            .map_err(|_| AuthError::MalformedToken)?;

        let message = if is_mfa {
            format!("mfa.{account_seg}.{time_seg}")
        } else {
            format!("{account_seg}.{time_seg}")
        };

        let mut token = Token::new(account_id, issue_time);
        if is_mfa {
            token = token.into_mfa();
        }

        Ok(ParsedToken {
            token,
            message,
            signature: signature.to_owned(),
        })
    }
}

/// Outcome of [`Token::parse`]: the decoded fields alongside the raw
/// material needed for signature verification.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    pub token: Token,
    /// The exact string the signature must cover.
    pub message: String,
    /// The signature segment as carried in the token text.
    pub signature: String,
}

fn decode_segment(segment: &str) -> Result<String, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    String::from_utf8(bytes).map_err(|_| AuthError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_and_parse_round_trip() {
        let token = Token::new("acct-1", 123_456);
        let text = format!("{}.sig", token.message());
        let parsed = Token::parse(&text).unwrap();

        assert_eq!(parsed.token, token);
        assert_eq!(parsed.message, token.message());
        assert_eq!(parsed.signature, "sig");
        assert!(!parsed.token.is_mfa());
    }

    #[test]
    fn mfa_marker_round_trips() {
        let token = Token::new("acct-1", 42).into_mfa();
        let text = format!("{}.sig", token.message());
        let parsed = Token::parse(&text).unwrap();

        assert!(parsed.token.is_mfa());
        assert!(parsed.message.starts_with("mfa."));
        assert_eq!(parsed.token.account_id(), "acct-1");
        assert_eq!(parsed.token.issue_time(), 42);
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        assert!(matches!(
            Token::parse("only.two"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            Token::parse("not.a.valid.token.at.all"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(Token::parse(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn non_base64url_segments_are_malformed() {
        assert!(matches!(
            Token::parse("&&&.YQ.sig"),
            Err(AuthError::MalformedToken)
        ));
        // Valid base64url but not a decimal time.
        let bad_time = URL_SAFE_NO_PAD.encode(b"not-a-number");
        let account = URL_SAFE_NO_PAD.encode(b"acct");
        assert!(matches!(
            Token::parse(&format!("{account}.{bad_time}.sig")),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn prefix_rejects_dots_and_empty() {
        assert!(Token::new("a", 0).with_prefix("bot").is_ok());
        assert!(matches!(
            Token::new("a", 0).with_prefix("b.ot"),
            Err(AuthError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Token::new("a", 0).with_prefix(""),
            Err(AuthError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn prefixed_message_keeps_prefix_literal() {
        let token = Token::new("a", 7).with_prefix("bot").unwrap();
        assert!(token.message().starts_with("bot."));
        assert!(!token.is_mfa());
    }

    #[test]
    fn segments_are_unpadded() {
        // "acct-1" encodes with padding in padded alphabets; ours must
        // never carry '='.
        let token = Token::new("acct-1", 1);
        assert!(!token.message().contains('='));
    }
}
