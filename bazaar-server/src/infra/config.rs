use std::{env, fmt, time::Duration};

use anyhow::{Context, anyhow};
use secrecy::{ExposeSecret, SecretString};

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,

    // Development settings
    pub dev_mode: bool,

    // Access token signing
    pub jwt_signing_key: SecretString,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_duration_minutes: i64,
    pub refresh_token_days: i64,

    // Authentication secrets (pepper for Argon2 + HMAC key for one-time codes)
    pub auth_password_pepper: SecretString,
    pub auth_token_key: SecretString,

    /// `None` routes mail to the log instead of an SMTP relay.
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    pub mail_display_name: String,
    pub email_delivery_timeout: Duration,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("dev_mode", &self.dev_mode)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("jwt_duration_minutes", &self.jwt_duration_minutes)
            .field("refresh_token_days", &self.refresh_token_days)
            .field("smtp", &self.smtp)
            .field("mail_from", &self.mail_from)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

const DEFAULT_PASSWORD_PEPPER: &str = "change-me-password-pepper";
const DEFAULT_TOKEN_KEY: &str = "change-me-hmac-key";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let var = |name: &str, default: &str| {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let jwt_signing_key = lookup("JWT_SIGNING_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("JWT_SIGNING_KEY must be set"))?;

        let smtp = match lookup("SMTP_HOST").filter(|host| !host.is_empty()) {
            Some(host) => Some(SmtpConfig {
                host,
                port: var("SMTP_PORT", "587")
                    .parse()
                    .context("SMTP_PORT must be a port number")?,
                username: var("SMTP_USER", ""),
                password: SecretString::from(var("SMTP_PASS", "")),
            }),
            None => None,
        };

        Ok(Self {
            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port: var("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a port number")?,

            cors_allowed_origins: var(
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:5173,https://localhost:5173",
            )
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),

            dev_mode: var("DEV_MODE", "false").parse().unwrap_or(false),

            jwt_signing_key: SecretString::from(jwt_signing_key),
            jwt_issuer: var("JWT_ISSUER", "bazaar-identity"),
            jwt_audience: var("JWT_AUDIENCE", "bazaar-clients"),
            jwt_duration_minutes: var("JWT_DURATION_MINUTES", "15")
                .parse()
                .context("JWT_DURATION_MINUTES must be an integer")?,
            refresh_token_days: var("REFRESH_TOKEN_DAYS", "7")
                .parse()
                .context("REFRESH_TOKEN_DAYS must be an integer")?,

            auth_password_pepper: SecretString::from(var(
                "AUTH_PASSWORD_PEPPER",
                DEFAULT_PASSWORD_PEPPER,
            )),
            auth_token_key: SecretString::from(var(
                "AUTH_TOKEN_KEY",
                DEFAULT_TOKEN_KEY,
            )),

            smtp,
            mail_from: var("MAIL_FROM", "no-reply@bazaar.local"),
            mail_display_name: var("MAIL_DISPLAY_NAME", "Bazaar"),
            email_delivery_timeout: Duration::from_secs(
                var("EMAIL_DELIVERY_TIMEOUT_SECS", "10")
                    .parse()
                    .context("EMAIL_DELIVERY_TIMEOUT_SECS must be an integer")?,
            ),
        })
    }

    /// True while either auth secret still has its placeholder value.
    pub fn uses_default_secrets(&self) -> bool {
        self.auth_password_pepper.expose_secret() == DEFAULT_PASSWORD_PEPPER
            || self.auth_token_key.expose_secret() == DEFAULT_TOKEN_KEY
    }

    /// `"Display Name <address>"` sender line.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.mail_display_name, self.mail_from)
    }
}
