pub mod repositories;
pub mod services;
pub mod value_objects;

pub use repositories::{CredentialStore, RotationCommit, StoreError};
pub use services::*;
pub use value_objects::{AccessClaims, RefreshToken, RevocationReason};
