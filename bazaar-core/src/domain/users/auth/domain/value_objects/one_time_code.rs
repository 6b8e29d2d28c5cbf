use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

const CODE_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum OneTimeCodeError {
    #[error("code generation failed")]
    GenerationFailed,
    #[error("code is not correctly encoded")]
    Malformed,
}

/// What a one-time code authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePurpose {
    EmailConfirmation,
    PasswordReset,
}

impl CodePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailConfirmation => "email_confirmation",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// Stored half of a one-time code. Only the keyed digest of the secret is
/// kept; the secret itself leaves the process in an email and nowhere else.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    purpose: CodePurpose,
    digest: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn new(
        purpose: CodePurpose,
        digest: String,
        created_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            purpose,
            digest,
            created_at,
            expires_at: created_at + lifetime,
        }
    }

    pub fn purpose(&self) -> CodePurpose {
        self.purpose
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// True when `digest` matches and the code is still within its lifetime.
    pub fn accepts(&self, digest: &str, now: DateTime<Utc>) -> bool {
        if self.is_expired(now) {
            return false;
        }
        let stored = self.digest.as_bytes();
        let presented = digest.as_bytes();
        stored.len() == presented.len() && constant_time_eq(stored, presented)
    }
}

/// Fresh one-time secret: 32 random bytes as padded standard base64.
pub fn generate_code_secret() -> Result<Zeroizing<String>, OneTimeCodeError> {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| OneTimeCodeError::GenerationFailed)?;
    let secret = Zeroizing::new(STANDARD.encode(bytes));
    bytes.zeroize();
    Ok(secret)
}

/// Confirmation codes travel as URL-safe base64 of the secret's bytes.
pub fn encode_confirmation_code(secret: &str) -> String {
    URL_SAFE_NO_PAD.encode(secret.as_bytes())
}

pub fn decode_confirmation_code(
    encoded: &str,
) -> Result<Zeroizing<String>, OneTimeCodeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim().trim_end_matches('='))
        .map_err(|_| OneTimeCodeError::Malformed)?;
    String::from_utf8(bytes)
        .map(Zeroizing::new)
        .map_err(|_| OneTimeCodeError::Malformed)
}

/// Reset codes travel percent-encoded.
pub fn escape_reset_code(secret: &str) -> String {
    urlencoding::encode(secret).into_owned()
}

pub fn unescape_reset_code(
    escaped: &str,
) -> Result<Zeroizing<String>, OneTimeCodeError> {
    urlencoding::decode(escaped.trim())
        .map(|decoded| Zeroizing::new(decoded.into_owned()))
        .map_err(|_| OneTimeCodeError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_encoding_is_url_safe() {
        let secret = generate_code_secret().unwrap();
        let encoded = encode_confirmation_code(&secret);
        assert!(!encoded.contains(['+', '/', '=']));
        assert_eq!(*decode_confirmation_code(&encoded).unwrap(), *secret);
    }

    #[test]
    fn malformed_confirmation_code_is_rejected() {
        assert!(decode_confirmation_code("not*base64").is_err());
    }

    #[test]
    fn reset_escaping_protects_reserved_characters() {
        let escaped = escape_reset_code("ab+/c==");
        assert_eq!(escaped, "ab%2B%2Fc%3D%3D");
        assert_eq!(*unescape_reset_code(&escaped).unwrap(), "ab+/c==");
    }

    #[test]
    fn accepts_matching_digest_until_expiry() {
        let now = Utc::now();
        let code = OneTimeCode::new(
            CodePurpose::PasswordReset,
            "abcd".into(),
            now,
            Duration::hours(24),
        );
        assert!(code.accepts("abcd", now));
        assert!(!code.accepts("abce", now));
        assert!(!code.accepts("abcd", now + Duration::hours(25)));
    }
}
