use std::fmt;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use tracing::info;

use bazaar_core::{EmailError, EmailGateway, EmailMessage};

use crate::infra::config::SmtpConfig;

/// Delivers mail through an SMTP relay with STARTTLS.
#[derive(Clone)]
pub struct SmtpEmailGateway {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    default_sender: String,
}

impl fmt::Debug for SmtpEmailGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpEmailGateway")
            .field("default_sender", &self.default_sender)
            .finish_non_exhaustive()
    }
}

impl SmtpEmailGateway {
    pub fn new(
        config: &SmtpConfig,
        default_sender: impl Into<String>,
    ) -> Result<Self, SmtpError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
                .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            default_sender: default_sender.into(),
        })
    }
}

#[async_trait]
impl EmailGateway for SmtpEmailGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let email = build_message(message, &self.default_sender)?;

        self.mailer
            .send(email)
            .await
            .map_err(|err| EmailError::Delivery(err.to_string()))?;

        info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

/// HTML message, sent as `multipart/alternative` when a plain-text version
/// is present. `default_sender` applies when `message.from` is unset.
pub fn build_message(
    message: &EmailMessage,
    default_sender: &str,
) -> Result<Message, EmailError> {
    let from = message.from.as_deref().unwrap_or(default_sender);
    let from: Mailbox = from
        .parse()
        .map_err(|_| EmailError::InvalidAddress(from.to_string()))?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|_| EmailError::InvalidAddress(message.to.clone()))?;

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str());

    let built = match &message.text {
        Some(text) => builder.multipart(MultiPart::alternative_plain_html(
            text.clone(),
            message.body.clone(),
        )),
        None => builder
            .header(ContentType::TEXT_HTML)
            .body(message.body.clone()),
    };
    built.map_err(|err| EmailError::Message(err.to_string()))
}
