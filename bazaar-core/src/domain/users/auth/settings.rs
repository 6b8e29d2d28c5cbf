use std::fmt;
use std::time::Duration as StdDuration;

use chrono::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

use super::policy::PasswordPolicy;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("signing key must not be empty")]
    EmptySigningKey,
    #[error("{0} must not be empty")]
    MissingValue(&'static str),
    #[error("{0} must be positive")]
    NonPositiveLifetime(&'static str),
}

/// Everything the token service needs to mint and check tokens.
///
/// Passed explicitly to [`TokenService::new`](super::domain::services::TokenService::new);
/// there is no process-wide signing state.
#[derive(Clone)]
pub struct TokenSettings {
    signing_key: Zeroizing<Vec<u8>>,
    issuer: String,
    audience: String,
    access_token_lifetime: Duration,
    refresh_token_lifetime: Duration,
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("signing_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .finish()
    }
}

impl TokenSettings {
    pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;

    pub fn new(
        signing_key: impl AsRef<[u8]>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        access_token_minutes: i64,
    ) -> Result<Self, SettingsError> {
        let key = signing_key.as_ref();
        if key.is_empty() {
            return Err(SettingsError::EmptySigningKey);
        }

        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(SettingsError::MissingValue("issuer"));
        }
        let audience = audience.into();
        if audience.trim().is_empty() {
            return Err(SettingsError::MissingValue("audience"));
        }
        if access_token_minutes <= 0 {
            return Err(SettingsError::NonPositiveLifetime(
                "access token lifetime",
            ));
        }

        Ok(Self {
            signing_key: Zeroizing::new(key.to_vec()),
            issuer,
            audience,
            access_token_lifetime: Duration::minutes(access_token_minutes),
            refresh_token_lifetime: Duration::days(
                Self::DEFAULT_REFRESH_TOKEN_DAYS,
            ),
        })
    }

    pub fn with_refresh_token_lifetime(
        mut self,
        lifetime: Duration,
    ) -> Result<Self, SettingsError> {
        if lifetime <= Duration::zero() {
            return Err(SettingsError::NonPositiveLifetime(
                "refresh token lifetime",
            ));
        }
        self.refresh_token_lifetime = lifetime;
        Ok(self)
    }

    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn access_token_lifetime(&self) -> Duration {
        self.access_token_lifetime
    }

    pub fn refresh_token_lifetime(&self) -> Duration {
        self.refresh_token_lifetime
    }
}

/// Knobs for the account flows.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Upper bound on a single email delivery attempt.
    pub delivery_timeout: StdDuration,
    /// How long confirmation and reset codes stay valid.
    pub code_lifetime: Duration,
    pub password_policy: PasswordPolicy,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            delivery_timeout: StdDuration::from_secs(10),
            code_lifetime: Duration::hours(24),
            password_policy: PasswordPolicy::default(),
        }
    }
}
