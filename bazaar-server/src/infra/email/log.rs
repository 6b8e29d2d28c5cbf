use async_trait::async_trait;
use tracing::{debug, info};

use bazaar_core::{EmailError, EmailGateway, EmailMessage};

/// Development gateway: writes each message to the log and reports success.
///
/// Codes in the body are masked at `info`. The raw body is only emitted at
/// `debug`, for local runs without a relay.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmailGateway;

/// Replaces every `[..]` span, where the mail bodies carry their codes.
fn mask_codes(body: &str) -> String {
    let mut masked = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']') else {
            break;
        };
        masked.push_str(&rest[..open]);
        masked.push_str("[***]");
        rest = &rest[open + close + 1..];
    }
    masked.push_str(rest);
    masked
}

#[async_trait]
impl EmailGateway for LogEmailGateway {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if message.to.trim().is_empty() {
            return Err(EmailError::InvalidAddress(message.to.clone()));
        }

        info!(
            to = %message.to,
            subject = %message.subject,
            body = %mask_codes(&message.body),
            "email delivery skipped (no SMTP relay configured)"
        );
        debug!(to = %message.to, body = %message.body, "unmasked email body");
        Ok(())
    }
}
