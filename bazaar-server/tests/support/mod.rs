#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use bazaar_core::AuthCrypto;
use bazaar_core::api::routes::v1;
use bazaar_core::domain::users::auth::domain::services::AdminProvisionOutcome;
use bazaar_core::infrastructure::memory::{
    InMemoryCredentialStore, RecordingEmailGateway,
};
use bazaar_server::{
    AppState,
    infra::{config::Config, startup::build_app_state_with},
    routes::create_app,
};

pub const PASSWORD: &str = "Abcdef1!";
pub const ADMIN_EMAIL: &str = "root@bazaar.test";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<InMemoryCredentialStore>,
    pub email: Arc<RecordingEmailGateway>,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("JWT_SIGNING_KEY", "server-test-signing-key"),
        ("AUTH_PASSWORD_PEPPER", "server-test-pepper"),
        ("AUTH_TOKEN_KEY", "server-test-code-key"),
        ("EMAIL_DELIVERY_TIMEOUT_SECS", "1"),
    ]);
    Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .expect("test configuration is valid")
}

pub fn build_test_app() -> TestApp {
    let store = Arc::new(InMemoryCredentialStore::new());
    let email = Arc::new(RecordingEmailGateway::new());
    let crypto = AuthCrypto::insecure_fast("server-test-pepper", "server-test-code-key")
        .expect("crypto parameters are valid");

    let state = build_app_state_with(test_config(), store.clone(), email.clone(), crypto)
        .expect("app state builds");
    let server = TestServer::new(create_app(state.clone())).expect("test server starts");

    TestApp {
        server,
        state,
        store,
        email,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

impl TestApp {
    pub async fn register(&self, email: &str, user_type: &str) -> StatusCode {
        self.server
            .post(v1::auth::REGISTER)
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "userType": user_type,
            }))
            .await
            .status_code()
    }

    /// Returns `(jwToken, refreshToken)`.
    pub async fn sign_in(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .server
            .post(v1::auth::AUTHENTICATE)
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        (
            body["jwToken"].as_str().expect("jwToken present").to_string(),
            body["refreshToken"]
                .as_str()
                .expect("refreshToken present")
                .to_string(),
        )
    }

    /// Code embedded in the latest mail to `to`, as sent on the wire.
    pub fn mailed_code(&self, to: &str) -> String {
        let message = self.email.last_to(to).expect("a mail was sent");
        let start = message.body.find('[').expect("code start") + 1;
        let end = message.body[start..].find(']').expect("code end") + start;
        message.body[start..end].to_string()
    }

    pub async fn confirm(&self, email: &str) {
        let token = self.mailed_code(email);
        self.server
            .post(v1::auth::CONFIRM_EMAIL)
            .json(&json!({ "email": email, "token": token }))
            .await
            .assert_status_ok();
    }

    /// Registered, confirmed, and signed in.
    pub async fn member(&self, email: &str, user_type: &str) -> (String, String) {
        assert_eq!(self.register(email, user_type).await, StatusCode::OK);
        self.confirm(email).await;
        self.sign_in(email, PASSWORD).await
    }

    pub async fn admin(&self) -> (String, String) {
        let outcome = self.state.accounts().provision_admin(ADMIN_EMAIL, PASSWORD).await;
        assert!(matches!(
            outcome,
            AdminProvisionOutcome::Created(_) | AdminProvisionOutcome::AlreadyExists
        ));
        self.sign_in(ADMIN_EMAIL, PASSWORD).await
    }
}
