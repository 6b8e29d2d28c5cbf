use serde::{Deserialize, Serialize};

use crate::domain::users::Role;

/// Claims carried by a signed access token.
///
/// `role` holds one entry per role assigned to the user at mint time, so a
/// role change only becomes visible once the token is reissued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub jti: String,
    /// Absent in the token decodes as empty; see [`Self::subject_email`].
    #[serde(default)]
    pub email: String,
    pub uid: String,
    #[serde(default)]
    pub role: Vec<Role>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.role.contains(&role)
    }

    /// Subject email, if the token carries a non-empty one.
    pub fn subject_email(&self) -> Option<&str> {
        let email = self.email.trim();
        (!email.is_empty()).then_some(email)
    }
}
