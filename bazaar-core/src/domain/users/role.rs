use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of roles a Bazaar account can hold.
///
/// Every user carries exactly one role for its whole lifetime. The serialized
/// names double as the values of the `role` claim in access tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Role {
    Admin,
    Customer,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Customer => "Customer",
            Self::Vendor => "Vendor",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Customer" => Ok(Self::Customer),
            "Vendor" => Ok(Self::Vendor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Account kinds that can be created through self-service registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum UserType {
    Customer,
    Vendor,
}

impl UserType {
    pub fn role(self) -> Role {
        match self {
            Self::Customer => Role::Customer,
            Self::Vendor => Role::Vendor,
        }
    }
}

impl From<UserType> for Role {
    fn from(value: UserType) -> Self {
        value.role()
    }
}
