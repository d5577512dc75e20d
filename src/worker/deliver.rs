use tracing::info;

use crate::core::config::MailConfig;
use crate::email::{NotificationService, OutboundEmail};
use crate::errors::DigestError;

/// Sends the rendered digest to the configured recipients, once, without retry.
pub struct DeliveryAdapter<'a> {
    notifier: &'a dyn NotificationService,
    mail: &'a MailConfig,
}

impl<'a> DeliveryAdapter<'a> {
    #[must_use]
    pub fn new(notifier: &'a dyn NotificationService, mail: &'a MailConfig) -> Self {
        Self { notifier, mail }
    }

    #[must_use]
    pub fn compose(&self, digest_text: &str) -> OutboundEmail {
        OutboundEmail {
            from: self.mail.account.clone(),
            to: self.mail.recipients.clone(),
            subject: self.mail.subject.clone(),
            body: digest_text.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns `DeliveryError` if the notification service fails.
    pub async fn deliver(&self, digest_text: &str) -> Result<(), DigestError> {
        let email = self.compose(digest_text);
        info!(
            "Delivering digest to {} recipient(s) with subject {:?}",
            email.to.len(),
            email.subject
        );
        self.notifier.send(&email).await
    }
}
