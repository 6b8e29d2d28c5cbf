use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::domain::users::auth::domain::repositories::{
    CredentialStore, RotationCommit, StoreError, StoreResult,
};
use crate::domain::users::auth::domain::value_objects::{
    CodePurpose, OneTimeCode, RefreshToken, RevocationReason,
};
use crate::domain::users::{Profile, User, UserId, normalize_email};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
    profiles: HashMap<UserId, Profile>,
    codes: HashMap<(UserId, CodePurpose), OneTimeCode>,
}

impl Tables {
    fn user_mut(&mut self, user_id: UserId) -> StoreResult<&mut User> {
        self.users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound(user_id))
    }
}

/// Credential store held entirely in process memory.
///
/// All tables sit behind one lock that each method takes exactly once, so
/// every operation is atomic and the lock is never held across an await.
///
/// Revoked and expired refresh tokens stay on the user so that replaying one
/// is answered with `Expired` rather than an unknown-token result. Tokens
/// that expired more than `token_retention` ago are pruned whenever a new
/// token is attached to the same user, which bounds both memory and the
/// linear scan in [`find_by_refresh_token`](CredentialStore::find_by_refresh_token).
pub struct InMemoryCredentialStore {
    tables: RwLock<Tables>,
    token_retention: Duration,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::with_token_retention(Duration::days(
            Self::DEFAULT_TOKEN_RETENTION_DAYS,
        ))
    }
}

impl std::fmt::Debug for InMemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("InMemoryCredentialStore")
            .field("users", &tables.users.len())
            .field("profiles", &tables.profiles.len())
            .field("codes", &tables.codes.len())
            .finish()
    }
}

impl InMemoryCredentialStore {
    pub const DEFAULT_TOKEN_RETENTION_DAYS: i64 = 30;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_retention(token_retention: Duration) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            token_retention,
        }
    }

    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let key = normalize_email(email);
        let tables = self.tables.read();
        Ok(tables
            .by_email
            .get(&key)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().users.get(&user_id).cloned())
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> StoreResult<Option<User>> {
        let tables = self.tables.read();
        Ok(tables
            .users
            .values()
            .find(|user| user.find_refresh_token(token).is_some())
            .cloned())
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.by_email.contains_key(&user.normalized_email) {
            return Err(StoreError::EmailConflict(user.email.clone()));
        }
        tables
            .by_email
            .insert(user.normalized_email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let Some(user) = tables.users.remove(&user_id) else {
            return Ok(false);
        };
        tables.by_email.remove(&user.normalized_email);
        tables.profiles.remove(&user_id);
        tables.codes.retain(|(owner, _), _| *owner != user_id);
        Ok(true)
    }

    async fn mark_email_confirmed(&self, user_id: UserId) -> StoreResult<()> {
        self.tables.write().user_mut(user_id)?.confirm_email();
        Ok(())
    }

    async fn attach_refresh_token(
        &self,
        user_id: UserId,
        token: RefreshToken,
    ) -> StoreResult<()> {
        let cutoff = Utc::now() - self.token_retention;
        let mut tables = self.tables.write();
        let user = tables.user_mut(user_id)?;
        user.prune_refresh_tokens(cutoff);
        user.refresh_tokens.push(token);
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: UserId,
        presented: &str,
        replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<RotationCommit> {
        let mut tables = self.tables.write();
        let user = tables.user_mut(user_id)?;

        let Some(current) = user.find_refresh_token_mut(presented) else {
            return Ok(RotationCommit::NotFound);
        };
        if !current.is_active(now) {
            return Ok(RotationCommit::Inactive);
        }

        current.revoke(now, RevocationReason::Rotation);
        user.prune_refresh_tokens(now - self.token_retention);
        user.refresh_tokens.push(replacement);
        user.updated_at = now;
        Ok(RotationCommit::Rotated)
    }

    async fn reset_password(
        &self,
        user_id: UserId,
        digest: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<usize>> {
        let mut tables = self.tables.write();
        let key = (user_id, CodePurpose::PasswordReset);
        let accepted = tables
            .codes
            .get(&key)
            .is_some_and(|code| code.accepts(digest, now));
        if !accepted {
            return Ok(None);
        }

        let user = tables.user_mut(user_id)?;
        user.set_password_hash(password_hash.to_string());
        let revoked =
            user.revoke_refresh_tokens(now, RevocationReason::PasswordReset);
        tables.codes.remove(&key);
        Ok(Some(revoked))
    }

    async fn find_profile(
        &self,
        user_id: UserId,
    ) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().profiles.get(&user_id).cloned())
    }

    async fn save_profile(
        &self,
        user_id: UserId,
        profile: &Profile,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }
        tables.profiles.insert(user_id, profile.clone());
        Ok(())
    }

    async fn store_code(
        &self,
        user_id: UserId,
        code: OneTimeCode,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }
        tables.codes.insert((user_id, code.purpose()), code);
        Ok(())
    }

    async fn consume_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
        digest: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let key = (user_id, purpose);
        let accepted = tables
            .codes
            .get(&key)
            .is_some_and(|code| code.accepts(digest, now));
        if accepted {
            tables.codes.remove(&key);
        }
        Ok(accepted)
    }
}
