use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use super::outcomes::{
    AdminProvisionOutcome, AuthenticationOutcome, ConfirmEmailOutcome,
    ConfirmPasswordResetOutcome, PasswordResetOutcome, RegisterOutcome,
    UpdateUserInfoOutcome, UserInfoOutcome,
};
use super::token_service::TokenService;
use crate::domain::notifications::{EmailGateway, EmailMessage, deliver_within};
use crate::domain::users::auth::domain::repositories::{
    CredentialStore, StoreError,
};
use crate::domain::users::auth::domain::value_objects::{
    CodePurpose, OneTimeCode, decode_confirmation_code,
    encode_confirmation_code, escape_reset_code, generate_code_secret,
    unescape_reset_code,
};
use crate::domain::users::auth::{AccountSettings, AuthCrypto};
use crate::domain::users::{
    AuthenticationRequest, ConfirmEmailRequest, ConfirmPasswordResetRequest,
    PasswordResetRequest, Profile, ProfileUpdate, RegisterRequest, Role,
    UpdateCustomerRequest, UpdateVendorRequest, User, UserId,
};

const CONFIRMATION_SUBJECT: &str = "EMAIL CONFIRMATION";
const RESET_SUBJECT: &str = "RESET YOUR PASSWORD";

fn confirmation_body(code: &str) -> String {
    format!(
        "<h1>Welcome to Bazaar!</h1>\n\
         <p>This is your email confirmation code [{code}], confirm before it expires!</p>\n\
         <p>If you didn't request this, please ignore this email.</p>"
    )
}

fn reset_body(code: &str) -> String {
    format!(
        "<p>This is your password reset code [{code}]</p>\n\
         <p>If you didn't request this, please ignore this email.</p>"
    )
}

fn confirmation_text(code: &str) -> String {
    format!(
        "Welcome to Bazaar!\n\n\
         This is your email confirmation code [{code}], confirm before it expires!\n\n\
         If you didn't request this, please ignore this email."
    )
}

fn reset_text(code: &str) -> String {
    format!(
        "This is your password reset code [{code}]\n\n\
         If you didn't request this, please ignore this email."
    )
}

/// Account flows: registration, authentication, email confirmation,
/// password reset, and profile reads and writes.
///
/// Owns the compensating delete that undoes a registration whose
/// confirmation mail could not be sent.
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    email: Arc<dyn EmailGateway>,
    tokens: Arc<TokenService>,
    crypto: Arc<AuthCrypto>,
    settings: AccountSettings,
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("store_refs", &Arc::strong_count(&self.store))
            .field("email_refs", &Arc::strong_count(&self.email))
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        email: Arc<dyn EmailGateway>,
        tokens: Arc<TokenService>,
        crypto: Arc<AuthCrypto>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            store,
            email,
            tokens,
            crypto,
            settings,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> RegisterOutcome {
        let RegisterRequest {
            email,
            password,
            user_type,
        } = request;
        let password = Zeroizing::new(password);

        match self.store.find_by_email(&email).await {
            Ok(Some(_)) => return RegisterOutcome::EmailAlreadyExists,
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "user lookup failed during registration");
                return RegisterOutcome::SystemError;
            }
        }

        let check = self.settings.password_policy.check(&password);
        if !check.is_satisfied() {
            warn!(failures = %check.describe(), "registration password rejected by policy");
            return RegisterOutcome::SystemError;
        }

        let password_hash = match self.hash_password(&password).await {
            Ok(hash) => hash,
            Err(err) => {
                error!(error = %err, "password hashing failed during registration");
                return RegisterOutcome::SystemError;
            }
        };

        let user = User::new(email, password_hash, user_type.role());
        match self.store.create_user(&user).await {
            Ok(()) => {}
            Err(StoreError::EmailConflict(_)) => {
                return RegisterOutcome::EmailAlreadyExists;
            }
            Err(err) => {
                error!(error = %err, "user creation failed");
                return RegisterOutcome::SystemError;
            }
        }

        if let Err(outcome) = self.complete_registration(&user).await {
            self.roll_back_registration(user.id).await;
            return outcome;
        }

        info!(user_id = %user.id, role = %user.role, "user registered");
        RegisterOutcome::Success
    }

    /// Everything after the user row exists. Any `Err` means the caller must
    /// delete the user again.
    async fn complete_registration(
        &self,
        user: &User,
    ) -> Result<(), RegisterOutcome> {
        if let Some(profile) = Profile::empty_for(user.role) {
            self.store
                .save_profile(user.id, &profile)
                .await
                .map_err(|err| {
                    error!(user_id = %user.id, error = %err, "profile creation failed");
                    RegisterOutcome::SystemError
                })?;
        }

        let secret = self
            .issue_code(user.id, CodePurpose::EmailConfirmation)
            .await
            .map_err(|err| {
                error!(user_id = %user.id, error = %err, "confirmation code issue failed");
                RegisterOutcome::SystemError
            })?;

        let code = encode_confirmation_code(&secret);
        let message = EmailMessage::new(
            &user.email,
            CONFIRMATION_SUBJECT,
            confirmation_body(&code),
        )
        .with_text(confirmation_text(&code));
        deliver_within(
            self.email.as_ref(),
            &message,
            self.settings.delivery_timeout,
        )
        .await
        .map_err(|err| {
            warn!(user_id = %user.id, error = %err, "confirmation email not delivered");
            RegisterOutcome::EmailCantBeSend
        })
    }

    async fn roll_back_registration(&self, user_id: UserId) {
        match self.store.delete_user(user_id).await {
            Ok(_) => info!(user_id = %user_id, "registration rolled back"),
            Err(err) => {
                error!(user_id = %user_id, error = %err, "registration rollback failed")
            }
        }
    }

    pub async fn authenticate(
        &self,
        request: AuthenticationRequest,
    ) -> AuthenticationOutcome {
        let password = Zeroizing::new(request.password);
        let user = match self.store.find_by_email(&request.email).await {
            Ok(Some(user)) => user,
            Ok(None) => return AuthenticationOutcome::EmailNotFound,
            Err(err) => {
                error!(error = %err, "user lookup failed during authentication");
                return AuthenticationOutcome::Unexpected;
            }
        };

        match self.verify_password(&password, &user.password_hash).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %user.id, "authentication with wrong password");
                return AuthenticationOutcome::WrongPassword;
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "password verification failed");
                return AuthenticationOutcome::Unexpected;
            }
        }

        match self.tokens.issue_token_pair(&user).await {
            Ok(pair) => {
                info!(user_id = %user.id, "user authenticated");
                AuthenticationOutcome::Success(pair)
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "token issue failed");
                AuthenticationOutcome::Unexpected
            }
        }
    }

    pub async fn confirm_email(
        &self,
        request: ConfirmEmailRequest,
    ) -> ConfirmEmailOutcome {
        let user = match self.store.find_by_email(&request.email).await {
            Ok(Some(user)) => user,
            Ok(None) => return ConfirmEmailOutcome::EmailNotFound,
            Err(err) => {
                error!(error = %err, "user lookup failed during confirmation");
                return ConfirmEmailOutcome::Unexpected;
            }
        };

        let Ok(secret) = decode_confirmation_code(&request.token) else {
            return ConfirmEmailOutcome::InvalidToken;
        };

        match self
            .consume_code(user.id, CodePurpose::EmailConfirmation, &secret)
            .await
        {
            Ok(true) => {}
            Ok(false) => return ConfirmEmailOutcome::InvalidToken,
            Err(err) => {
                error!(user_id = %user.id, error = %err, "confirmation code check failed");
                return ConfirmEmailOutcome::Unexpected;
            }
        }

        match self.store.mark_email_confirmed(user.id).await {
            Ok(()) => {
                info!(user_id = %user.id, "email confirmed");
                ConfirmEmailOutcome::Success
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "failed to mark email confirmed");
                ConfirmEmailOutcome::Unexpected
            }
        }
    }

    pub async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> PasswordResetOutcome {
        let user = match self.store.find_by_email(&request.email).await {
            Ok(Some(user)) => user,
            Ok(None) => return PasswordResetOutcome::EmailNotFound,
            Err(err) => {
                error!(error = %err, "user lookup failed during reset request");
                return PasswordResetOutcome::Unexpected;
            }
        };

        let secret = match self.issue_code(user.id, CodePurpose::PasswordReset).await
        {
            Ok(secret) => secret,
            Err(err) => {
                error!(user_id = %user.id, error = %err, "reset code issue failed");
                return PasswordResetOutcome::Unexpected;
            }
        };

        let code = escape_reset_code(&secret);
        let message = EmailMessage::new(&user.email, RESET_SUBJECT, reset_body(&code))
            .with_text(reset_text(&code));
        match deliver_within(
            self.email.as_ref(),
            &message,
            self.settings.delivery_timeout,
        )
        .await
        {
            Ok(()) => {
                info!(user_id = %user.id, "password reset code sent");
                PasswordResetOutcome::Success
            }
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "reset email not delivered");
                PasswordResetOutcome::EmailCantBeSend
            }
        }
    }

    /// Replace the password when the reset code checks out. Every refresh
    /// token the user held is revoked on success.
    pub async fn confirm_password_reset(
        &self,
        request: ConfirmPasswordResetRequest,
    ) -> ConfirmPasswordResetOutcome {
        let password = Zeroizing::new(request.password);
        let user = match self.store.find_by_email(&request.email).await {
            Ok(Some(user)) => user,
            Ok(None) => return ConfirmPasswordResetOutcome::EmailNotFound,
            Err(err) => {
                error!(error = %err, "user lookup failed during reset");
                return ConfirmPasswordResetOutcome::Unexpected;
            }
        };

        let Ok(secret) = unescape_reset_code(&request.token) else {
            return ConfirmPasswordResetOutcome::UnsupportedPasswordFormat;
        };

        let check = self.settings.password_policy.check(&password);
        if !check.is_satisfied() {
            warn!(user_id = %user.id, failures = %check.describe(), "reset password rejected by policy");
            return ConfirmPasswordResetOutcome::UnsupportedPasswordFormat;
        }

        let password_hash = match self.hash_password(&password).await {
            Ok(hash) => hash,
            Err(err) => {
                error!(user_id = %user.id, error = %err, "password hashing failed during reset");
                return ConfirmPasswordResetOutcome::Unexpected;
            }
        };

        let digest = match self.crypto.hash_code(&secret) {
            Ok(digest) => digest,
            Err(err) => {
                error!(user_id = %user.id, error = %err, "reset code digest failed");
                return ConfirmPasswordResetOutcome::Unexpected;
            }
        };

        match self
            .store
            .reset_password(user.id, &digest, &password_hash, Utc::now())
            .await
        {
            Ok(Some(revoked)) => {
                info!(user_id = %user.id, revoked, "password reset completed");
                ConfirmPasswordResetOutcome::Success
            }
            Ok(None) => {
                warn!(user_id = %user.id, "password reset with invalid code");
                ConfirmPasswordResetOutcome::UnsupportedPasswordFormat
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "password reset write failed");
                ConfirmPasswordResetOutcome::Unexpected
            }
        }
    }

    pub async fn get_user_info(&self, email: &str) -> UserInfoOutcome {
        let user = match self.store.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => return UserInfoOutcome::EmailNotFound,
            Err(err) => {
                error!(error = %err, "user lookup failed");
                return UserInfoOutcome::Unexpected;
            }
        };

        if user.role.is_admin() {
            return UserInfoOutcome::UserIsAdmin;
        }

        match self.store.find_profile(user.id).await {
            Ok(Some(profile)) if profile.role() == user.role => {
                UserInfoOutcome::Success(profile.into())
            }
            Ok(Some(profile)) => {
                error!(
                    user_id = %user.id,
                    role = %user.role,
                    profile_role = %profile.role(),
                    "profile kind does not match user role"
                );
                UserInfoOutcome::Unexpected
            }
            Ok(None) if user.role == Role::Customer => {
                UserInfoOutcome::CustomerNotInitialized
            }
            Ok(None) => UserInfoOutcome::VendorNotInitialized,
            Err(err) => {
                error!(user_id = %user.id, error = %err, "profile lookup failed");
                UserInfoOutcome::Unexpected
            }
        }
    }

    /// Overwrite the profile of `email`. The update's kind fixes the role the
    /// target must hold; the carried access token only has to be valid.
    pub async fn update_user_info(
        &self,
        email: &str,
        update: ProfileUpdate,
    ) -> UpdateUserInfoOutcome {
        if !self.tokens.validate_access_token(update.access_token()) {
            return UpdateUserInfoOutcome::InvalidToken;
        }

        let user = match self.store.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => return UpdateUserInfoOutcome::EmailNotFound,
            Err(err) => {
                error!(error = %err, "user lookup failed during profile update");
                return UpdateUserInfoOutcome::Unexpected;
            }
        };

        if user.role.is_admin() {
            return UpdateUserInfoOutcome::UserIsAdmin;
        }
        if user.role != update.expected_role() {
            warn!(
                user_id = %user.id,
                role = %user.role,
                expected = %update.expected_role(),
                "profile update for wrong user type"
            );
            return UpdateUserInfoOutcome::WrongUserType;
        }

        let profile = update.into_profile();
        if let Err(err) = profile.validate() {
            return UpdateUserInfoOutcome::InvalidProfile(err);
        }

        match self.store.save_profile(user.id, &profile).await {
            Ok(()) => {
                info!(user_id = %user.id, "profile updated");
                UpdateUserInfoOutcome::Success
            }
            Err(err) => {
                error!(user_id = %user.id, error = %err, "profile update failed");
                UpdateUserInfoOutcome::Unexpected
            }
        }
    }

    pub async fn update_customer_info(
        &self,
        email: &str,
        request: UpdateCustomerRequest,
    ) -> UpdateUserInfoOutcome {
        self.update_user_info(email, ProfileUpdate::Customer(request))
            .await
    }

    pub async fn update_vendor_info(
        &self,
        email: &str,
        request: UpdateVendorRequest,
    ) -> UpdateUserInfoOutcome {
        self.update_user_info(email, ProfileUpdate::Vendor(request))
            .await
    }

    /// Create a confirmed admin account without a profile.
    pub async fn provision_admin(
        &self,
        email: &str,
        password: &str,
    ) -> AdminProvisionOutcome {
        match self.store.find_by_email(email).await {
            Ok(Some(_)) => return AdminProvisionOutcome::AlreadyExists,
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "user lookup failed during admin provisioning");
                return AdminProvisionOutcome::SystemError;
            }
        }

        let check = self.settings.password_policy.check(password);
        if !check.is_satisfied() {
            warn!(failures = %check.describe(), "admin password rejected by policy");
            return AdminProvisionOutcome::SystemError;
        }

        let password_hash = match self.hash_password(password).await {
            Ok(hash) => hash,
            Err(err) => {
                error!(error = %err, "password hashing failed during admin provisioning");
                return AdminProvisionOutcome::SystemError;
            }
        };

        let mut user = User::new(email, password_hash, Role::Admin);
        user.email_confirmed = true;
        match self.store.create_user(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "admin account provisioned");
                AdminProvisionOutcome::Created(user.id)
            }
            Err(StoreError::EmailConflict(_)) => AdminProvisionOutcome::AlreadyExists,
            Err(err) => {
                error!(error = %err, "admin creation failed");
                AdminProvisionOutcome::SystemError
            }
        }
    }

    async fn issue_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
    ) -> anyhow::Result<Zeroizing<String>> {
        let secret = generate_code_secret()?;
        let digest = self.crypto.hash_code(&secret)?;
        let code = OneTimeCode::new(
            purpose,
            digest,
            Utc::now(),
            self.settings.code_lifetime,
        );
        self.store
            .store_code(user_id, code)
            .await
            .with_context(|| format!("storing {} code", purpose.as_str()))?;
        Ok(secret)
    }

    async fn consume_code(
        &self,
        user_id: UserId,
        purpose: CodePurpose,
        secret: &str,
    ) -> anyhow::Result<bool> {
        let digest = self.crypto.hash_code(secret)?;
        Ok(self
            .store
            .consume_code(user_id, purpose, &digest, Utc::now())
            .await?)
    }

    /// Hashes on the blocking pool.
    async fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let crypto = Arc::clone(&self.crypto);
        let password = Zeroizing::new(password.to_string());
        let hash = tokio::task::spawn_blocking(move || {
            crypto.hash_password(&password)
        })
        .await
        .context("password hashing task failed")??;
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let crypto = Arc::clone(&self.crypto);
        let password = Zeroizing::new(password.to_string());
        let password_hash = password_hash.to_string();
        let verified = tokio::task::spawn_blocking(move || {
            crypto.verify_password(&password, &password_hash)
        })
        .await
        .context("password verification task failed")??;
        Ok(verified)
    }
}
