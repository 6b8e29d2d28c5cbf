use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::outcomes::{RefreshTokenOutcome, RotationResult};
use crate::domain::users::auth::TokenSettings;
use crate::domain::users::auth::domain::repositories::{
    CredentialStore, RotationCommit, StoreError,
};
use crate::domain::users::auth::domain::value_objects::{
    AccessClaims, RefreshToken, RefreshTokenError,
};
use crate::domain::users::{TokenPair, User};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("refresh token generation failed: {0}")]
    Generation(#[from] RefreshTokenError),
    #[error("access token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("access token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Mints and checks access tokens, mints refresh tokens, and rotates them.
///
/// Access tokens are HS256 JWTs bound to the configured issuer and audience.
/// Validation allows no clock leeway.
pub struct TokenService {
    settings: TokenSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("settings", &self.settings)
            .field("store_refs", &Arc::strong_count(&self.store))
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(settings: TokenSettings, store: Arc<dyn CredentialStore>) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.signing_key());
        let decoding_key = DecodingKey::from_secret(settings.signing_key());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer()]);
        validation.set_audience(&[settings.audience()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = 0;

        Self {
            settings,
            encoding_key,
            decoding_key,
            validation,
            store,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue_access_token_at(user, Utc::now())
    }

    /// Mint an access token as if issued at `issued_at`.
    pub fn issue_access_token_at(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at + self.settings.access_token_lifetime();
        let claims = AccessClaims {
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            uid: user.id.to_string(),
            role: vec![user.role],
            iss: self.settings.issuer().to_string(),
            aud: self.settings.audience().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    pub fn issue_refresh_token(&self) -> Result<RefreshToken, TokenError> {
        Ok(RefreshToken::generate(
            self.settings.refresh_token_lifetime(),
        )?)
    }

    /// Signature, issuer, audience, and expiry check. Never errors.
    pub fn validate_access_token(&self, token: &str) -> bool {
        match self.decode_access_token(token) {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "access token failed validation");
                false
            }
        }
    }

    pub fn decode_access_token(
        &self,
        token: &str,
    ) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }

    /// Mint a fresh access and refresh token and attach the refresh token to
    /// the user.
    pub async fn issue_token_pair(
        &self,
        user: &User,
    ) -> anyhow::Result<TokenPair> {
        let jw_token = self.issue_access_token(user)?;
        let refresh = self.issue_refresh_token()?;
        let refresh_token = refresh.as_str().to_string();
        self.store.attach_refresh_token(user.id, refresh).await?;

        Ok(TokenPair {
            jw_token,
            refresh_token,
        })
    }

    /// Exchange `presented` for a new token pair.
    ///
    /// The swap happens inside the store as one compare-and-swap, so two
    /// concurrent rotations of the same value yield at most one success; the
    /// loser sees the token already revoked and gets `Expired`.
    pub async fn rotate_refresh_token(
        &self,
        user: &User,
        presented: &str,
    ) -> RotationResult {
        let now = Utc::now();
        match user.find_refresh_token(presented) {
            None => return RotationResult::UserNotFound,
            Some(token) if !token.is_active(now) => {
                warn!(user_id = %user.id, "refresh attempted with inactive token");
                return RotationResult::Expired;
            }
            Some(_) => {}
        }

        let replacement = match RefreshToken::generate_at(
            self.settings.refresh_token_lifetime(),
            now,
        ) {
            Ok(token) => token,
            Err(err) => {
                error!(error = %err, "failed to generate refresh token");
                return RotationResult::Unexpected;
            }
        };
        let refresh_token = replacement.as_str().to_string();

        match self
            .store
            .rotate_refresh_token(user.id, presented, replacement, now)
            .await
        {
            Ok(RotationCommit::Rotated) => {}
            Ok(RotationCommit::Inactive) => {
                warn!(user_id = %user.id, "refresh token was rotated concurrently");
                return RotationResult::Expired;
            }
            Ok(RotationCommit::NotFound) | Err(StoreError::UserNotFound(_)) => {
                return RotationResult::UserNotFound;
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "refresh rotation failed");
                return RotationResult::Unexpected;
            }
        }

        match self.issue_access_token_at(user, now) {
            Ok(jw_token) => {
                info!(user_id = %user.id, "refresh token rotated");
                RotationResult::Success(TokenPair {
                    jw_token,
                    refresh_token,
                })
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "failed to mint access token");
                RotationResult::Unexpected
            }
        }
    }

    /// Refresh entry point: find the token's owner, then rotate.
    pub async fn refresh(&self, presented: &str) -> RefreshTokenOutcome {
        let user = match self.store.find_by_refresh_token(presented).await {
            Ok(Some(user)) => user,
            Ok(None) => return RefreshTokenOutcome::EmailNotFound,
            Err(err) => {
                error!(error = %err, "refresh token lookup failed");
                return RefreshTokenOutcome::Unexpected;
            }
        };

        match self.rotate_refresh_token(&user, presented).await {
            RotationResult::Success(pair) => RefreshTokenOutcome::Success(pair),
            RotationResult::UserNotFound => RefreshTokenOutcome::EmailNotFound,
            RotationResult::Expired => RefreshTokenOutcome::Expired,
            RotationResult::Unexpected => RefreshTokenOutcome::Unexpected,
        }
    }
}
