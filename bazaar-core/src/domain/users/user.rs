use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::role::Role;
use crate::domain::users::auth::domain::value_objects::{
    RefreshToken, RevocationReason,
};

const MAX_EMAIL_LENGTH: usize = 254;

/// Opaque user identifier, rendered as a string on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Field-level validation failures for inbound requests and profile data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} is required")]
    Missing(&'static str),
}

/// Canonical lookup key for an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shape check for an email address: one `@`, a non-empty local part, and a
/// dotted domain without whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());
    let trimmed = email.trim();

    if trimmed.is_empty() || trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(invalid());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Account record owned by the credential store.
///
/// The user owns its refresh tokens by value; nothing points back at the
/// user from a token. Profiles live in a separate table keyed by `id`.
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    /// Address exactly as registered.
    pub email: String,
    /// Lowercased lookup key, unique across all users.
    pub normalized_email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub role: Role,
    pub refresh_tokens: Vec<RefreshToken>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("email_confirmed", &self.email_confirmed)
            .field("role", &self.role)
            .field("refresh_tokens", &self.refresh_tokens.len())
            .finish_non_exhaustive()
    }
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: String,
        role: Role,
    ) -> Self {
        let email = email.into().trim().to_string();
        let now = Utc::now();
        Self {
            id: UserId::new(),
            normalized_email: normalize_email(&email),
            email,
            password_hash,
            email_confirmed: false,
            role,
            refresh_tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.updated_at = Utc::now();
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Constant-time lookup of a refresh token by its value.
    pub fn find_refresh_token(&self, value: &str) -> Option<&RefreshToken> {
        self.refresh_tokens
            .iter()
            .find(|token| token.secure_compare(value))
    }

    pub fn find_refresh_token_mut(
        &mut self,
        value: &str,
    ) -> Option<&mut RefreshToken> {
        self.refresh_tokens
            .iter_mut()
            .find(|token| token.secure_compare(value))
    }

    pub fn active_refresh_tokens(
        &self,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &RefreshToken> {
        self.refresh_tokens
            .iter()
            .filter(move |token| token.is_active(now))
    }

    /// Revoke every token that is still active. Returns how many changed.
    pub fn revoke_refresh_tokens(
        &mut self,
        now: DateTime<Utc>,
        reason: RevocationReason,
    ) -> usize {
        let mut revoked = 0;
        for token in self
            .refresh_tokens
            .iter_mut()
            .filter(|token| token.is_active(now))
        {
            token.revoke(now, reason);
            revoked += 1;
        }
        if revoked > 0 {
            self.updated_at = now;
        }
        revoked
    }

    /// Drop tokens that expired before `cutoff`, revoked or not. Returns how
    /// many were removed.
    pub fn prune_refresh_tokens(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.refresh_tokens.len();
        self.refresh_tokens
            .retain(|token| token.expires_at() >= cutoff);
        before - self.refresh_tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn normalizes_email_for_lookup() {
        let user = User::new("  Alice@Example.COM ", "hash".into(), Role::Customer);
        assert_eq!(user.email, "Alice@Example.COM");
        assert_eq!(user.normalized_email, "alice@example.com");
        assert!(!user.email_confirmed);
    }

    #[test]
    fn validates_email_shape() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@shop.example.org").is_ok());

        for bad in ["", "plain", "@x.com", "a@", "a@x", "a@@x.com", "a b@x.com", "a@x..com"] {
            assert!(
                matches!(validate_email(bad), Err(ValidationError::InvalidEmail(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn revokes_only_active_tokens() {
        let now = Utc::now();
        let mut user = User::new("a@x.com", "hash".into(), Role::Vendor);
        let active = RefreshToken::generate(Duration::days(7)).unwrap();
        let stale =
            RefreshToken::generate_at(Duration::days(7), now - Duration::days(10))
                .unwrap();
        user.refresh_tokens.push(active.clone());
        user.refresh_tokens.push(stale);

        assert_eq!(user.revoke_refresh_tokens(now, RevocationReason::PasswordReset), 1);
        assert_eq!(user.active_refresh_tokens(now).count(), 0);
        let revoked = user.find_refresh_token(active.as_str()).unwrap();
        assert_eq!(revoked.revocation_reason(), Some(RevocationReason::PasswordReset));
    }

    #[test]
    fn prunes_tokens_expired_before_the_cutoff() {
        let now = Utc::now();
        let mut user = User::new("a@x.com", "hash".into(), Role::Customer);
        let ancient =
            RefreshToken::generate_at(Duration::days(7), now - Duration::days(60))
                .unwrap();
        let recent =
            RefreshToken::generate_at(Duration::days(7), now - Duration::days(10))
                .unwrap();
        let recent_value = recent.as_str().to_string();
        user.refresh_tokens.push(ancient);
        user.refresh_tokens.push(recent);

        assert_eq!(user.prune_refresh_tokens(now - Duration::days(30)), 1);
        assert_eq!(user.refresh_tokens.len(), 1);
        assert!(user.find_refresh_token(&recent_value).is_some());
    }

    #[test]
    fn debug_output_omits_credentials() {
        let user = User::new("a@x.com", "$argon2id$secret".into(), Role::Customer);
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("argon2id"));
    }
}
