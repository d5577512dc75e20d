/// Queue Digest - a scheduled worker that mails a digest of queued messages.
///
/// Each invocation drains a small batch from a work queue, summarizes every
/// item with two chat-completion passes, folds the summaries into one
/// numbered digest, removes the processed items and emails the digest.
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda, fired by a schedule, for execution
/// - SQS as the work queue
/// - an `OpenAI` or Azure `OpenAI` chat-completions endpoint for summaries
/// - lettre over SMTP/STARTTLS for delivery
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use queue_digest::ai::LlmClient;
/// use queue_digest::core::config::AppConfig;
/// use queue_digest::email::SmtpNotifier;
/// use queue_digest::queue::SqsQueue;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     queue_digest::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let queue = SqsQueue::from_env(config.queue_url.clone()).await;
///     let llm_client = LlmClient::new(&config.transform)?;
///     let notifier = SmtpNotifier::new(&config.mail)?;
///
///     let report =
///         queue_digest::worker::run_digest(&config, &queue, &llm_client, &notifier).await?;
///     println!("acquired {} items, delivered: {}", report.stats.acquired, report.delivered);
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod core;
pub mod email;
pub mod errors;
pub mod queue;
pub mod worker;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Output goes to `CloudWatch` Logs as JSON with the event target. The level
/// is taken from `RUST_LOG` and defaults to `info`. Calling it again after a
/// subscriber is installed is a no-op.
///
/// # Example
///
/// ```
/// queue_digest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
