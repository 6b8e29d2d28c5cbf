use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::Zeroize;

use super::RevocationReason;

const TOKEN_BYTES: usize = 64;

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("system RNG unavailable for refresh token")]
    GenerationFailed,
}

/// Opaque refresh credential owned by a single user.
///
/// `expired` means the clock passed `expires_at`; `active` additionally
/// requires that the token was never revoked.
#[derive(Clone)]
pub struct RefreshToken {
    value: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    revocation_reason: Option<RevocationReason>,
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshToken")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("revoked_at", &self.revoked_at)
            .field("revocation_reason", &self.revocation_reason)
            .finish_non_exhaustive()
    }
}

impl RefreshToken {
    pub fn generate(lifetime: Duration) -> Result<Self, RefreshTokenError> {
        Self::generate_at(lifetime, Utc::now())
    }

    pub fn generate_at(
        lifetime: Duration,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RefreshTokenError> {
        let mut token_bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut token_bytes)
            .map_err(|_| RefreshTokenError::GenerationFailed)?;

        let value = STANDARD.encode(token_bytes);
        token_bytes.zeroize();

        Ok(Self {
            value,
            created_at,
            expires_at: created_at + lifetime,
            revoked_at: None,
            revocation_reason: None,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    pub fn revocation_reason(&self) -> Option<RevocationReason> {
        self.revocation_reason
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }

    /// Marks the token revoked. The first revocation wins.
    pub fn revoke(&mut self, now: DateTime<Utc>, reason: RevocationReason) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(now);
            self.revocation_reason = Some(reason);
        }
    }

    /// Constant-time match against a presented value.
    pub fn secure_compare(&self, presented: &str) -> bool {
        constant_time_eq(self.value.as_bytes(), presented.as_bytes())
    }
}

impl Drop for RefreshToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}
