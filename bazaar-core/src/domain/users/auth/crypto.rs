use argon2::{Algorithm, Argon2, Params, Version};
use hmac::{Hmac, Mac};
use password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString,
};
use rand::{TryRngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Argon2id work factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Cost {
    pub memory_kib: u32,
    pub passes: u32,
    pub lanes: u32,
}

impl Argon2Cost {
    /// 64 MiB, three passes, one lane.
    pub const STANDARD: Self = Self {
        memory_kib: 64 * 1024,
        passes: 3,
        lanes: 1,
    };

    /// Smallest cost argon2 accepts. Tests only.
    pub const MINIMAL: Self = Self {
        memory_kib: Params::MIN_M_COST,
        passes: 1,
        lanes: 1,
    };

    fn params(self) -> Result<Params, AuthCryptoError> {
        Params::new(self.memory_kib, self.passes, self.lanes, Some(32))
            .map_err(|err| AuthCryptoError::Cost(err.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("AUTH_PASSWORD_PEPPER is empty")]
    MissingPepper,
    #[error("AUTH_TOKEN_KEY is empty")]
    MissingCodeKey,
    #[error("argon2 cost rejected: {0}")]
    Cost(String),
    #[error("salt generation failed: {0}")]
    Salt(String),
    #[error("stored password hash unusable: {0}")]
    Hash(String),
    #[error("code key rejected by HMAC: {0}")]
    Digest(String),
}

impl From<password_hash::Error> for AuthCryptoError {
    fn from(err: password_hash::Error) -> Self {
        Self::Hash(err.to_string())
    }
}

/// Credential hashing for the account service.
///
/// Passwords are peppered and run through Argon2id. Confirmation and reset
/// codes are reduced to an HMAC-SHA-256 hex digest before they are stored.
pub struct AuthCrypto {
    argon2: Argon2<'static>,
    pepper: Zeroizing<Vec<u8>>,
    code_key: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self.argon2.params();
        f.debug_struct("AuthCrypto")
            .field("memory_kib", &params.m_cost())
            .field("passes", &params.t_cost())
            .finish_non_exhaustive()
    }
}

impl AuthCrypto {
    pub fn new(
        pepper: impl AsRef<[u8]>,
        code_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        Self::with_cost(pepper, code_key, Argon2Cost::STANDARD)
    }

    /// Never use outside tests; the cost is trivially brute-forced.
    pub fn insecure_fast(
        pepper: impl AsRef<[u8]>,
        code_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        Self::with_cost(pepper, code_key, Argon2Cost::MINIMAL)
    }

    pub fn with_cost(
        pepper: impl AsRef<[u8]>,
        code_key: impl AsRef<[u8]>,
        cost: Argon2Cost,
    ) -> Result<Self, AuthCryptoError> {
        let (pepper, code_key) = (pepper.as_ref(), code_key.as_ref());
        if pepper.is_empty() {
            return Err(AuthCryptoError::MissingPepper);
        }
        if code_key.is_empty() {
            return Err(AuthCryptoError::MissingCodeKey);
        }

        Ok(Self {
            argon2: Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                cost.params()?,
            ),
            pepper: Zeroizing::new(pepper.to_vec()),
            code_key: Zeroizing::new(code_key.to_vec()),
        })
    }

    /// Password bytes followed by the pepper, wiped on drop.
    fn seasoned(&self, password: &str) -> Zeroizing<Vec<u8>> {
        Zeroizing::new([password.as_bytes(), self.pepper.as_slice()].concat())
    }

    fn fresh_salt() -> Result<SaltString, AuthCryptoError> {
        let mut raw = [0u8; Salt::RECOMMENDED_LENGTH];
        OsRng
            .try_fill_bytes(&mut raw)
            .map_err(|err| AuthCryptoError::Salt(err.to_string()))?;
        Ok(SaltString::encode_b64(&raw)?)
    }

    /// PHC-format Argon2id hash of the peppered password.
    pub fn hash_password(
        &self,
        password: &str,
    ) -> Result<String, AuthCryptoError> {
        let salt = Self::fresh_salt()?;
        let phc = self
            .argon2
            .hash_password(&self.seasoned(password), &salt)?;
        Ok(phc.to_string())
    }

    /// `Ok(false)` on mismatch. `Err` only when `phc` cannot be parsed.
    pub fn verify_password(
        &self,
        password: &str,
        phc: &str,
    ) -> Result<bool, AuthCryptoError> {
        let stored = PasswordHash::new(phc)?;
        Ok(self
            .argon2
            .verify_password(&self.seasoned(password), &stored)
            .is_ok())
    }

    pub fn hash_code(&self, code: &str) -> Result<String, AuthCryptoError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.code_key)
            .map_err(|err| AuthCryptoError::Digest(err.to_string()))?;
        mac.update(code.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
