use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::notifications::{EmailError, EmailGateway, EmailMessage};

/// How [`RecordingEmailGateway`] answers the next sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    #[default]
    Deliver,
    /// Every send fails with a delivery error.
    Fail,
    /// Every send hangs until the caller gives up.
    Stall,
}

/// Gateway that keeps delivered messages in memory.
#[derive(Debug, Default)]
pub struct RecordingEmailGateway {
    outbox: Mutex<Vec<EmailMessage>>,
    mode: Mutex<DeliveryMode>,
}

impl RecordingEmailGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: DeliveryMode) -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            mode: Mutex::new(mode),
        }
    }

    pub fn set_mode(&self, mode: DeliveryMode) {
        *self.mode.lock() = mode;
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().clone()
    }

    /// Most recent message delivered to `to`.
    pub fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.outbox
            .lock()
            .iter()
            .rev()
            .find(|message| message.to.eq_ignore_ascii_case(to))
            .cloned()
    }
}

#[async_trait]
impl EmailGateway for RecordingEmailGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let mode = *self.mode.lock();
        match mode {
            DeliveryMode::Deliver => {
                debug!(to = %message.to, subject = %message.subject, "recorded email");
                self.outbox.lock().push(message.clone());
                Ok(())
            }
            DeliveryMode::Fail => Err(EmailError::Delivery(
                "recording gateway configured to fail".into(),
            )),
            DeliveryMode::Stall => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}
