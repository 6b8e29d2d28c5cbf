use std::fmt;

/// Enumerates the reasons a refresh token stops being usable before expiry.
///
/// Kept as a closed set so store records and logs agree on the wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationReason {
    /// Token was exchanged for a new pair in the refresh flow.
    Rotation,
    /// The owner completed a password reset.
    PasswordReset,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotation => "rotation",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
