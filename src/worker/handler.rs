use chrono::Utc;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::deliver::DeliveryAdapter;
use super::processor::BatchProcessor;
use crate::ai::{LlmClient, TextTransform};
use crate::core::config::AppConfig;
use crate::core::models::RunReport;
use crate::email::{NotificationService, SmtpNotifier};
use crate::errors::DigestError;
use crate::queue::{QueueService, SqsQueue};

/// Process one batch and mail its digest.
///
/// Items are removed before delivery is attempted, so a delivery failure is
/// logged and reported but never undoes removals. A non-empty batch is always
/// mailed, even with no summaries, unless `send_empty_digest` is off. Only a
/// failed receive is returned as an error.
///
/// # Errors
///
/// Returns `AcquisitionError` if the batch cannot be received.
pub async fn run_digest(
    config: &AppConfig,
    queue: &dyn QueueService,
    transform: &dyn TextTransform,
    notifier: &dyn NotificationService,
) -> Result<RunReport, DigestError> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now().to_rfc3339();
    let span = info_span!("digest_run", run_id = %run_id);

    async move {
        let outcome = BatchProcessor::new(&config.batch, queue, transform)
            .run()
            .await
            .inspect_err(|e| error!("Aborting run: {}", e))?;

        let delivered = match outcome.digest {
            None => false,
            Some(ref digest) if digest.is_empty() && !config.mail.send_empty_digest => {
                warn!(
                    "All {} items failed to summarize, not sending an empty digest",
                    outcome.stats.acquired
                );
                false
            }
            Some(ref digest) => {
                if digest.is_empty() {
                    warn!(
                        "All {} items failed to summarize, sending an empty digest",
                        outcome.stats.acquired
                    );
                }
                match DeliveryAdapter::new(notifier, &config.mail)
                    .deliver(&digest.text)
                    .await
                {
                    Ok(()) => {
                        info!("Digest with {} entries delivered", digest.entries);
                        true
                    }
                    Err(e) => {
                        error!("Failed to deliver digest: {}", e);
                        false
                    }
                }
            }
        };

        Ok::<_, DigestError>(RunReport {
            run_id,
            started_at,
            stats: outcome.stats,
            delivered,
        })
    }
    .instrument(span)
    .await
}

/// Lambda handler for the scheduled trigger. The event payload is ignored.
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<RunReport, Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(DigestError::ConfigError(e))
    })?;
    info!("Digest trigger fired with payload: {:?}", event.payload);

    let queue = SqsQueue::from_env(config.queue_url.clone()).await;
    let llm_client = LlmClient::new(&config.transform)
        .map_err(|e| Error::from(format!("Failed to initialize LLM client: {e}")))?;
    let notifier = SmtpNotifier::new(&config.mail)
        .map_err(|e| Error::from(format!("Failed to initialize SMTP transport: {e}")))?;

    let report = run_digest(&config, &queue, &llm_client, &notifier)
        .await
        .map_err(Error::from)?;

    info!(
        "Run {} finished: delivered={}",
        report.run_id, report.delivered
    );
    Ok(report)
}

pub use self::function_handler as handler;
