//! One pass over the queue: acquire, summarize, aggregate, remove, format.

use futures::StreamExt;
use futures::stream;
use tracing::{error, info, warn};

use super::digest::format_digest;
use super::summarize::summarize_text;
use crate::ai::TextTransform;
use crate::core::config::{BatchSettings, RemovalPolicy};
use crate::core::models::{
    Aggregation, BatchOutcome, BatchStats, Digest, QueueItem, SummaryResult,
};
use crate::errors::{DigestError, TransformError};
use crate::queue::QueueService;

pub struct BatchProcessor<'a> {
    settings: &'a BatchSettings,
    queue: &'a dyn QueueService,
    transform: &'a dyn TextTransform,
}

impl<'a> BatchProcessor<'a> {
    #[must_use]
    pub fn new(
        settings: &'a BatchSettings,
        queue: &'a dyn QueueService,
        transform: &'a dyn TextTransform,
    ) -> Self {
        Self {
            settings,
            queue,
            transform,
        }
    }

    /// Drain one batch and build its digest.
    ///
    /// An empty queue yields an outcome without a digest and touches nothing.
    /// Per-item summarization and removal failures are logged and counted;
    /// only a failed receive aborts the run.
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionError` when the batch cannot be received.
    pub async fn run(&self) -> Result<BatchOutcome, DigestError> {
        let mut batch = self.queue.receive(self.settings.batch_size).await?;

        if batch.len() > self.settings.batch_size {
            warn!(
                "Queue returned {} items for a batch of {}, leaving the rest for redelivery",
                batch.len(),
                self.settings.batch_size
            );
            batch.truncate(self.settings.batch_size);
        }

        let mut stats = BatchStats {
            acquired: batch.len(),
            ..BatchStats::default()
        };

        if batch.is_empty() {
            info!("No queued items, nothing to digest");
            return Ok(BatchOutcome {
                stats,
                digest: None,
            });
        }

        let results = self.summarize_batch(&batch).await;
        let aggregation = aggregate(&batch, &results, &mut stats);
        self.remove_batch(&batch, &results, &mut stats).await;

        let digest = Digest {
            text: format_digest(&aggregation),
            entries: aggregation.len(),
        };
        info!(
            "Batch processed: acquired={} summarized={} failed={} removed={} digest_entries={}",
            stats.acquired, stats.summarized, stats.failed, stats.removed, digest.entries
        );

        Ok(BatchOutcome {
            stats,
            digest: Some(digest),
        })
    }

    /// Summaries come back in batch order whatever the concurrency.
    async fn summarize_batch(&self, batch: &[QueueItem]) -> Vec<Result<String, TransformError>> {
        let transform = self.transform;
        stream::iter(batch.iter().map(|item| summarize_text(transform, &item.content)))
            .buffered(self.settings.summarize_concurrency.max(1))
            .collect()
            .await
    }

    async fn remove_batch(
        &self,
        batch: &[QueueItem],
        results: &[Result<String, TransformError>],
        stats: &mut BatchStats,
    ) {
        for (item, result) in batch.iter().zip(results) {
            if result.is_err() && self.settings.removal_policy == RemovalPolicy::SkipFailed {
                warn!("Leaving unsummarized item {} in the queue", item.id);
                stats.skipped_removals += 1;
                continue;
            }

            match self.queue.remove(&item.id, &item.removal_token).await {
                Ok(()) => {
                    info!("Removed queue item {}", item.id);
                    stats.removed += 1;
                }
                Err(e) => {
                    error!("Failed to remove queue item {}: {}", item.id, e);
                    stats.removal_failures += 1;
                }
            }
        }
    }
}

/// Fold per-item results into the aggregation, in batch order.
fn aggregate(
    batch: &[QueueItem],
    results: &[Result<String, TransformError>],
    stats: &mut BatchStats,
) -> Aggregation {
    let mut aggregation = Aggregation::new();
    for (item, result) in batch.iter().zip(results) {
        match result {
            Ok(summary) => {
                stats.summarized += 1;
                aggregation.insert(SummaryResult {
                    original_content: item.aggregation_key(),
                    summary: summary.clone(),
                });
            }
            Err(e) => {
                error!("Failed to summarize queue item {}: {}", item.id, e);
                stats.failed += 1;
            }
        }
    }
    aggregation
}
