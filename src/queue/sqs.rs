use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::Message;
use tracing::{info, warn};

use super::QueueService;
use crate::core::models::QueueItem;
use crate::errors::DigestError;

pub struct SqsQueue {
    client: SqsClient,
    queue_url: String,
}

impl SqsQueue {
    #[must_use]
    pub fn new(client: SqsClient, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Build a client from the ambient AWS environment (Lambda role, profile, ...).
    pub async fn from_env(queue_url: impl Into<String>) -> Self {
        let shared_config = aws_config::from_env().load().await;
        Self::new(SqsClient::new(&shared_config), queue_url)
    }
}

/// Convert an SQS message into a queue item. Messages without an id or a
/// receipt handle cannot be removed and are dropped.
#[must_use]
pub fn to_queue_item(message: Message) -> Option<QueueItem> {
    let Message {
        message_id,
        receipt_handle,
        body,
        ..
    } = message;

    match (message_id, receipt_handle) {
        (Some(id), Some(handle)) => Some(QueueItem::new(id, handle, body.unwrap_or_default())),
        (id, _) => {
            warn!("Skipping SQS message without id or receipt handle: {:?}", id);
            None
        }
    }
}

#[async_trait]
impl QueueService for SqsQueue {
    async fn receive(&self, max_count: usize) -> Result<Vec<QueueItem>, DigestError> {
        let max_messages = i32::try_from(max_count).map_err(|e| {
            DigestError::AcquisitionError(format!("Batch size {max_count} out of range: {e}"))
        })?;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .send()
            .await
            .map_err(|e| DigestError::AcquisitionError(DisplayErrorContext(&e).to_string()))?;

        let items: Vec<QueueItem> = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(to_queue_item)
            .collect();

        info!("Received {} messages from {}", items.len(), self.queue_url);
        Ok(items)
    }

    async fn remove(&self, id: &str, removal_token: &str) -> Result<(), DigestError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(removal_token)
            .send()
            .await
            .map_err(|e| {
                DigestError::RemovalError(format!("{id}: {}", DisplayErrorContext(&e)))
            })?;
        Ok(())
    }
}
