//! Outbound email port.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("could not build message: {0}")]
    Message(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Structured outbound message. `body` is HTML; `text` is the plain-text
/// alternative for clients that do not render it. `from` falls back to the
/// gateway's default sender when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub text: Option<String>,
    pub from: Option<String>,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            text: None,
            from: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Send through `gateway`, giving up after `limit`.
pub async fn deliver_within(
    gateway: &dyn EmailGateway,
    message: &EmailMessage,
    limit: Duration,
) -> Result<(), EmailError> {
    match tokio::time::timeout(limit, gateway.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(EmailError::Timeout(limit)),
    }
}
