//! Token service configuration.

/// Configuration for the token service and OTP engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign tokens. Must be set by the deployment.
    pub secret: String,
    /// Token format version, covered by every signature (default: 1).
    pub version: u32,
    /// Number of digits in OTP codes (default: 6, the authenticator
    /// app standard).
    pub otp_digits: u32,
    /// TOTP step length in seconds (default: 30).
    pub totp_step_secs: u64,
    /// Length of generated OTP secrets in bytes (default: 20 = 160
    /// bits, the RFC 4226 recommendation).
    pub otp_secret_len: usize,
    /// How long a consumed HOTP code stays in the replay store, in
    /// seconds (default: 90). TOTP codes are retained for one step
    /// past their window instead.
    pub replay_ttl_secs: u64,
    /// Issuer label embedded in provisioning URIs. `None` omits the
    /// `issuer` query parameter.
    pub otp_issuer: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret: String::new(),
            version: 1,
            otp_digits: 6,
            totp_step_secs: 30,
            otp_secret_len: 20,
            replay_ttl_secs: 90,
            otp_issuer: None,
        }
    }
}
