use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::users::auth::domain::value_objects::{
    CodePurpose, OneTimeCode, RefreshToken,
};
use crate::domain::users::{Profile, User, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with email '{0}' already exists")]
    EmailConflict(String),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("store backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of an atomic refresh-token swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationCommit {
    /// The presented token was revoked and the replacement attached.
    Rotated,
    /// The user holds no token with the presented value.
    NotFound,
    /// The presented token was already revoked or expired. Nothing changed.
    Inactive,
}

/// Durable storage for users, their refresh tokens, profiles, and one-time
/// codes.
///
/// Every method is atomic with respect to every other method on the same
/// store. Email lookups are case-insensitive.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>>;

    /// Owner of the refresh token with this value, whatever its state.
    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> StoreResult<Option<User>>;

    /// Fails with [`StoreError::EmailConflict`] when the normalized email is
    /// taken.
    async fn create_user(&self, user: &User) -> StoreResult<()>;

    /// Removes the user together with its profile, tokens, and codes.
    /// Returns false when no such user existed.
    async fn delete_user(&self, user_id: UserId) -> StoreResult<bool>;

    async fn mark_email_confirmed(&self, user_id: UserId) -> StoreResult<()>;

    async fn attach_refresh_token(
        &self,
        user_id: UserId,
        token: RefreshToken,
    ) -> StoreResult<()>;

    /// Compare-and-swap: if `presented` is still active on the user, revoke
    /// it and attach `replacement` in one step.
    async fn rotate_refresh_token(
        &self,
        user_id: UserId,
        presented: &str,
        replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<RotationCommit>;

    /// Completes a password reset in one step: consumes the reset code
    /// matching `digest`, stores `password_hash`, and revokes every active
    /// refresh token with reason `password_reset`.
    ///
    /// Returns `None` and changes nothing when the code is absent, expired,
    /// or does not match. Otherwise returns how many tokens were revoked.
    async fn reset_password(
        &self,
        user_id: UserId,
        digest: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<usize>>;

    async fn find_profile(
        &self,
        user_id: UserId,
    ) -> StoreResult<Option<Profile>>;

    /// Inserts or overwrites the profile of an existing user.
    async fn save_profile(
        &self,
        user_id: UserId,
        profile: &Profile,
    ) -> StoreResult<()>;

    /// Stores a code, replacing any earlier code with the same purpose.
    async fn store_code(
        &self,
        user_id: UserId,
        code: OneTimeCode,
    ) -> StoreResult<()>;

    /// Removes the code if `digest` matches and it has not expired. Returns
    /// whether the code was accepted.
    async fn consume_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
        digest: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;
}
