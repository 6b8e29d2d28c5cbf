use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use secrecy::ExposeSecret;
use tracing::{info, warn};

use bazaar_core::domain::users::auth::domain::repositories::CredentialStore;
use bazaar_core::domain::users::auth::domain::services::create_identity_services;
use bazaar_core::infrastructure::memory::InMemoryCredentialStore;
use bazaar_core::{AccountSettings, AuthCrypto, EmailGateway, TokenSettings};

use crate::infra::{
    app_state::AppState,
    config::Config,
    email::{LogEmailGateway, SmtpEmailGateway},
};

/// Pick the email gateway the configuration asks for.
pub fn email_gateway(config: &Config) -> anyhow::Result<Arc<dyn EmailGateway>> {
    match &config.smtp {
        Some(smtp) => {
            let gateway = SmtpEmailGateway::new(smtp, config.sender())
                .with_context(|| format!("failed to configure SMTP relay {}", smtp.host))?;
            info!(host = %smtp.host, port = smtp.port, "SMTP email gateway configured");
            Ok(Arc::new(gateway))
        }
        None => {
            warn!("SMTP_HOST not set; outgoing mail is written to the log");
            Ok(Arc::new(LogEmailGateway))
        }
    }
}

/// Wire the identity services over the in-process store.
pub fn build_app_state(config: Config) -> anyhow::Result<AppState> {
    let email = email_gateway(&config)?;
    let crypto = AuthCrypto::new(
        config.auth_password_pepper.expose_secret(),
        config.auth_token_key.expose_secret(),
    )
    .context("failed to initialise password hashing")?;
    build_app_state_with(config, Arc::new(InMemoryCredentialStore::new()), email, crypto)
}

/// Same as [`build_app_state`] with the collaborators supplied by the caller.
pub fn build_app_state_with(
    config: Config,
    store: Arc<dyn CredentialStore>,
    email: Arc<dyn EmailGateway>,
    crypto: AuthCrypto,
) -> anyhow::Result<AppState> {
    if config.uses_default_secrets() {
        warn!("AUTH_PASSWORD_PEPPER or AUTH_TOKEN_KEY uses its placeholder value");
    }

    let token_settings = TokenSettings::new(
        config.jwt_signing_key.expose_secret(),
        config.jwt_issuer.clone(),
        config.jwt_audience.clone(),
        config.jwt_duration_minutes,
    )
    .and_then(|settings| {
        settings.with_refresh_token_lifetime(Duration::days(config.refresh_token_days))
    })
    .context("invalid token settings")?;

    let account_settings = AccountSettings {
        delivery_timeout: config.email_delivery_timeout,
        ..AccountSettings::default()
    };

    let services = create_identity_services(
        store,
        email,
        Arc::new(crypto),
        token_settings,
        account_settings,
    );

    Ok(AppState::new(services, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::infrastructure::memory::RecordingEmailGateway;
    use std::collections::HashMap;

    fn state_for(refresh_days: &str) -> anyhow::Result<AppState> {
        let vars = HashMap::from([
            ("JWT_SIGNING_KEY", "startup-key"),
            ("REFRESH_TOKEN_DAYS", refresh_days),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))?;
        build_app_state_with(
            config,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(RecordingEmailGateway::new()),
            AuthCrypto::insecure_fast("pepper", "code-key")?,
        )
    }

    #[test]
    fn refresh_lifetime_follows_configuration() {
        let state = state_for("30").unwrap();
        assert_eq!(
            state.tokens().settings().refresh_token_lifetime(),
            Duration::days(30)
        );
    }

    #[test]
    fn non_positive_refresh_lifetime_is_rejected() {
        assert!(state_for("0").is_err());
    }
}
