// Authentication value objects. Each is validated on construction and safe
// to move across tasks.

mod access_claims;
mod one_time_code;
mod refresh_token;
mod revocation_reason;

pub use access_claims::AccessClaims;
pub use one_time_code::{
    CodePurpose, OneTimeCode, OneTimeCodeError, decode_confirmation_code,
    encode_confirmation_code, escape_reset_code, generate_code_secret,
    unescape_reset_code,
};
pub use refresh_token::{RefreshToken, RefreshTokenError};
pub use revocation_reason::RevocationReason;
