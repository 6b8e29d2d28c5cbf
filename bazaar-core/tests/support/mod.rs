#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use bazaar_core::domain::users::auth::domain::services::{
    IdentityServices, RegisterOutcome, create_identity_services,
};
use bazaar_core::domain::users::auth::{AccountSettings, AuthCrypto, TokenSettings};
use bazaar_core::domain::users::{RegisterRequest, UserType};
use bazaar_core::infrastructure::memory::{
    InMemoryCredentialStore, RecordingEmailGateway,
};

pub const SIGNING_KEY: &str = "integration-signing-key";
pub const ISSUER: &str = "bazaar-identity";
pub const AUDIENCE: &str = "bazaar-clients";
pub const PASSWORD: &str = "Abcdef1!";

pub struct Harness {
    pub store: Arc<InMemoryCredentialStore>,
    pub email: Arc<RecordingEmailGateway>,
    pub services: IdentityServices,
}

pub fn token_settings() -> TokenSettings {
    TokenSettings::new(SIGNING_KEY, ISSUER, AUDIENCE, 15).unwrap()
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let email = Arc::new(RecordingEmailGateway::new());
        let crypto = Arc::new(AuthCrypto::insecure_fast("pepper", "code-key").unwrap());
        let account_settings = AccountSettings {
            delivery_timeout: StdDuration::from_millis(100),
            ..AccountSettings::default()
        };
        let services = create_identity_services(
            store.clone(),
            email.clone(),
            crypto,
            token_settings(),
            account_settings,
        );

        Self {
            store,
            email,
            services,
        }
    }

    pub async fn register(&self, email: &str, user_type: UserType) -> RegisterOutcome {
        self.services
            .accounts
            .register(RegisterRequest {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                user_type,
            })
            .await
    }

    /// Code embedded in the latest mail to `to`, as sent on the wire.
    pub fn mailed_code(&self, to: &str) -> String {
        let message = self.email.last_to(to).expect("a mail was sent");
        let start = message.body.find('[').expect("code start") + 1;
        let end = message.body[start..].find(']').expect("code end") + start;
        message.body[start..end].to_string()
    }
}
