pub mod crypto;
pub mod domain;
pub mod policy;
pub mod settings;

pub use crypto::{Argon2Cost, AuthCrypto, AuthCryptoError};
pub use policy::{CharClass, PasswordPolicy, PasswordPolicyCheck, PasswordPolicyRule};
pub use settings::{AccountSettings, SettingsError, TokenSettings};
