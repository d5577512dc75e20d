//! SMTP transport over STARTTLS.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{NotificationService, OutboundEmail};
use crate::core::config::MailConfig;
use crate::errors::DigestError;

pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// # Errors
    ///
    /// Returns an error if the relay host is unusable.
    pub fn new(config: &MailConfig) -> Result<Self, DigestError> {
        let creds = Credentials::new(config.account.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| DigestError::DeliveryError(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer })
    }
}

/// Build a `text/plain; charset=utf-8` message addressed to every recipient.
///
/// # Errors
///
/// Returns an error for unparsable addresses or an empty recipient list.
pub fn build_message(email: &OutboundEmail) -> Result<Message, DigestError> {
    let from: Mailbox = email.from.parse()?;
    let mut builder = Message::builder()
        .from(from)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    for recipient in &email.to {
        let to: Mailbox = recipient.parse()?;
        builder = builder.to(to);
    }

    Ok(builder.body(email.body.clone())?)
}

#[async_trait]
impl NotificationService for SmtpNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DigestError> {
        let message = build_message(email)?;
        self.mailer.send(message).await?;

        tracing::info!(
            to = ?email.to,
            subject = %email.subject,
            "Digest email sent"
        );
        Ok(())
    }
}
