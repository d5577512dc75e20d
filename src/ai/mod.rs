//! All AI/LLM functionality

pub mod client;
pub mod prompt_builder;

use async_trait::async_trait;

use crate::errors::TransformError;

// Re-export main types for convenience
pub use client::LlmClient;

/// One user/assistant exchange shown to the model as a style example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleTurn {
    pub user: String,
    pub assistant: String,
}

/// A single stateless call to the text-transform service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub system_instruction: String,
    pub example_turns: Vec<ExampleTurn>,
    pub user_text: String,
}

/// The remote text-transform service.
#[async_trait]
pub trait TextTransform: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the call fails or yields no usable text.
    async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError>;
}
