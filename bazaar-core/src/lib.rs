//! # Bazaar Core
//!
//! Identity and token-lifecycle engine for the Bazaar marketplace.
//!
//! ## Overview
//!
//! `bazaar-core` owns every state transition that touches credentials:
//!
//! - **Registration**: account creation with a matching customer or vendor
//!   profile, email confirmation codes, and compensating rollback when the
//!   confirmation mail cannot be delivered
//! - **Authentication**: Argon2id password checks that mint a signed access
//!   token and an opaque refresh token
//! - **Refresh rotation**: single-use refresh tokens, rotated atomically so a
//!   replayed token is always rejected
//! - **Password reset**: one-time reset codes that revoke outstanding
//!   refresh tokens on success
//! - **Role policy**: bearer token plus required role into allow or deny
//!
//! ## Architecture
//!
//! - [`domain::users`]: user records, roles, profiles, and the auth services
//! - [`domain::notifications`]: the outbound email port
//! - [`infrastructure::memory`]: in-process store and gateway implementations
//! - [`api::routes`]: versioned route constants shared with the HTTP layer
//!
//! Persistence and mail delivery sit behind the
//! [`CredentialStore`](domain::users::auth::domain::repositories::CredentialStore)
//! and [`EmailGateway`](domain::notifications::EmailGateway) traits. The
//! services never touch a concrete backend.

pub mod api;
pub mod domain;
pub mod infrastructure;

pub use domain::notifications::{EmailError, EmailGateway, EmailMessage};
pub use domain::users::auth::domain::services::{
    AccountService, AccountSettings, PolicyService, TokenService,
};
pub use domain::users::auth::{AuthCrypto, TokenSettings};
pub use domain::users::{Role, User, UserId, UserType};
