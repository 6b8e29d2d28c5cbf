use std::{fmt, sync::Arc};

use bazaar_core::domain::users::auth::domain::services::{
    AccountService, IdentityServices, PolicyService, TokenService,
};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub services: IdentityServices,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(services: IdentityServices, config: Config) -> Self {
        Self {
            services,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &TokenService {
        &self.services.tokens
    }

    pub fn accounts(&self) -> &AccountService {
        &self.services.accounts
    }

    pub fn policy(&self) -> &PolicyService {
        &self.services.policy
    }
}
