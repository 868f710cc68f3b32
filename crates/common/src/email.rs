use crate::domain::{DomainResult, EmailMessage, EmailSender};
use async_trait::async_trait;
use tracing::{info, instrument};

/// EmailSender that writes each message to the structured log instead of delivering it.
///
/// Used for local runs and environments without a mail relay.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender {
    include_body: bool,
}

impl LogEmailSender {
    /// `include_body` controls whether the message body (which may hold a sign-in code) is logged
    pub fn new(include_body: bool) -> Self {
        Self { include_body }
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> DomainResult<()> {
        if self.include_body {
            info!(to = %message.to, subject = %message.subject, body = %message.body, "email sent");
        } else {
            info!(to = %message.to, subject = %message.subject, "email sent");
        }
        Ok(())
    }
}
