pub mod account_service;
pub mod outcomes;
pub mod policy_service;
pub mod token_service;

pub use account_service::AccountService;
pub use outcomes::*;
pub use policy_service::PolicyService;
pub use token_service::{TokenError, TokenService};

pub use crate::domain::users::auth::AccountSettings;

use std::sync::Arc;

use crate::domain::notifications::EmailGateway;
use crate::domain::users::auth::domain::repositories::CredentialStore;
use crate::domain::users::auth::{AuthCrypto, TokenSettings};

/// The three services wired over one store.
#[derive(Debug, Clone)]
pub struct IdentityServices {
    pub tokens: Arc<TokenService>,
    pub accounts: Arc<AccountService>,
    pub policy: Arc<PolicyService>,
}

pub fn create_identity_services(
    store: Arc<dyn CredentialStore>,
    email: Arc<dyn EmailGateway>,
    crypto: Arc<AuthCrypto>,
    token_settings: TokenSettings,
    account_settings: AccountSettings,
) -> IdentityServices {
    let tokens = Arc::new(TokenService::new(token_settings, store.clone()));
    let accounts = Arc::new(AccountService::new(
        store.clone(),
        email,
        tokens.clone(),
        crypto,
        account_settings,
    ));
    let policy = Arc::new(PolicyService::new(tokens.clone(), store));

    IdentityServices {
        tokens,
        accounts,
        policy,
    }
}
