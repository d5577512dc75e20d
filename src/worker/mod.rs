//! Scheduled digest worker

pub mod deliver;
pub mod digest;
pub mod handler;
pub mod processor;
pub mod summarize;

// Re-export the main handler for convenience
pub use handler::{handler, run_digest};
pub use processor::BatchProcessor;
