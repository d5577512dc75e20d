//! Work queue access

pub mod sqs;

use async_trait::async_trait;

use crate::core::models::QueueItem;
use crate::errors::DigestError;

pub use sqs::SqsQueue;

/// At-least-once work queue the digest is drained from.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Receive up to `max_count` items, in the order the queue hands them out.
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionError` if the queue cannot be read.
    async fn receive(&self, max_count: usize) -> Result<Vec<QueueItem>, DigestError>;

    /// Permanently remove one received item.
    ///
    /// # Errors
    ///
    /// Returns `RemovalError` if the queue rejects the removal.
    async fn remove(&self, id: &str, removal_token: &str) -> Result<(), DigestError>;
}
