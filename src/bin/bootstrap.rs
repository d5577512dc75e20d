// Lambda bootstrap entry point for the scheduled digest worker

use lambda_runtime::{Error, run, service_fn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    queue_digest::setup_logging();
    run(service_fn(queue_digest::worker::handler)).await
}
