//! Outbound email channel

pub mod smtp;

use async_trait::async_trait;

use crate::errors::DigestError;

pub use smtp::SmtpNotifier;

/// A plain-text message ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// # Errors
    ///
    /// Returns `DeliveryError` if the message cannot be built or sent.
    async fn send(&self, email: &OutboundEmail) -> Result<(), DigestError>;
}
