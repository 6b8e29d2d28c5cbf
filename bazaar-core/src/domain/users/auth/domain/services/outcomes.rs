//! Closed result sets for every account, token, and policy operation.
//!
//! Payloads ride inside `Success`. Store and crypto faults never escape a
//! service as errors; they are logged and surface as `Unexpected` (or
//! `SystemError` where the operation names that case).

use std::fmt;

use crate::domain::users::{TokenPair, UserId, UserInfo, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Success,
    EmailAlreadyExists,
    SystemError,
    EmailCantBeSend,
}

#[derive(Debug, Clone)]
pub enum AuthenticationOutcome {
    Success(TokenPair),
    EmailNotFound,
    WrongPassword,
    Unexpected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEmailOutcome {
    Success,
    EmailNotFound,
    InvalidToken,
    Unexpected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordResetOutcome {
    Success,
    EmailNotFound,
    EmailCantBeSend,
    Unexpected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPasswordResetOutcome {
    Success,
    EmailNotFound,
    UnsupportedPasswordFormat,
    Unexpected,
}

/// Result of rotating a token that belongs to a known user.
#[derive(Debug, Clone)]
pub enum RotationResult {
    Success(TokenPair),
    /// The user holds no refresh token with the presented value.
    UserNotFound,
    /// The token was revoked or expired, including by a concurrent rotation.
    Expired,
    Unexpected,
}

/// Result of the refresh endpoint, where the owner is looked up by token.
#[derive(Debug, Clone)]
pub enum RefreshTokenOutcome {
    Success(TokenPair),
    EmailNotFound,
    Expired,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInfoOutcome {
    Success(UserInfo),
    EmailNotFound,
    UserIsAdmin,
    CustomerNotInitialized,
    VendorNotInitialized,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateUserInfoOutcome {
    Success,
    InvalidToken,
    EmailNotFound,
    UserIsAdmin,
    WrongUserType,
    InvalidProfile(ValidationError),
    Unexpected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminProvisionOutcome {
    Created(UserId),
    AlreadyExists,
    SystemError,
}

/// Why a policy check denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDenial {
    /// Signature, issuer, audience, or expiry check failed.
    InvalidToken,
    /// The token carries no subject email.
    MissingSubject,
    /// The subject is unknown or has not confirmed its email.
    EmailNotConfirmed,
    /// The token's role claims do not include the required role.
    RoleNotGranted,
}

impl PolicyDenial {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::MissingSubject => "missing_subject",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::RoleNotGranted => "role_not_granted",
        }
    }
}

impl fmt::Display for PolicyDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOutcome {
    Success,
    Failure(PolicyDenial),
    Unexpected,
}

