//! LLM (`OpenAI` / Azure `OpenAI`) chat-completions client.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::ChatCompletionRequest;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::prompt_builder::build_prompt;
use super::{TextTransform, TransformRequest};
use crate::core::config::{SamplingParams, TransformConfig, TransformEndpoint};
use crate::errors::TransformError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// LLM API client for the summarization passes
pub struct LlmClient {
    http: Client,
    url: String,
    headers: HeaderMap,
    model_name: String,
    sampling: SamplingParams,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be turned into request headers.
    pub fn new(config: &TransformConfig) -> Result<Self, TransformError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match &config.endpoint {
            TransformEndpoint::OpenAi { org_id, .. } => {
                let auth_value = format!("Bearer {}", config.api_key)
                    .parse()
                    .map_err(|e| TransformError::Http(format!("Invalid Authorization header: {e}")))?;
                headers.insert("Authorization", auth_value);

                if let Some(org) = org_id {
                    let org_value = org.parse().map_err(|e| {
                        TransformError::Http(format!("Invalid OpenAI-Organization header: {e}"))
                    })?;
                    headers.insert("OpenAI-Organization", org_value);
                }
            }
            TransformEndpoint::Azure { .. } => {
                let key_value = config
                    .api_key
                    .parse()
                    .map_err(|e| TransformError::Http(format!("Invalid api-key header: {e}")))?;
                headers.insert("api-key", key_value);
            }
        }

        let http = client_or_default(Client::builder().timeout(REQUEST_TIMEOUT).build());

        Ok(Self {
            http,
            url: completions_url(&config.endpoint, &config.model),
            headers,
            model_name: config.model.clone(),
            sampling: config.sampling,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_request(&self, request: &TransformRequest) -> ChatCompletionRequest {
        ChatCompletionRequest::new(self.model_name.clone(), build_prompt(request))
            .temperature(self.sampling.temperature)
            .max_tokens(self.sampling.max_tokens)
            .frequency_penalty(self.sampling.frequency_penalty)
            .presence_penalty(self.sampling.presence_penalty)
    }
}

/// Fall back to a default client, without the request timeout, when the
/// configured one cannot be built.
fn client_or_default(built: reqwest::Result<Client>) -> Client {
    built.unwrap_or_else(|e| {
        warn!(
            "Failed to build HTTP client with a {}s timeout, falling back to defaults without a timeout: {}",
            REQUEST_TIMEOUT.as_secs(),
            e
        );
        Client::new()
    })
}

/// Chat-completions URL for the configured provider.
#[must_use]
pub fn completions_url(endpoint: &TransformEndpoint, model: &str) -> String {
    match endpoint {
        TransformEndpoint::OpenAi { base_url, .. } => {
            format!("{}/chat/completions", base_url.trim_end_matches('/'))
        }
        TransformEndpoint::Azure {
            resource_url,
            api_version,
        } => format!(
            "{}/openai/deployments/{model}/chat/completions?api-version={api_version}",
            resource_url.trim_end_matches('/')
        ),
    }
}

/// Pull the first choice's text out of a chat-completions response body.
///
/// # Errors
///
/// Returns `Malformed` when the body has no choices and `EmptyResponse` when
/// the first choice carries no text.
pub fn extract_completion_text(response_json: &Value) -> Result<String, TransformError> {
    let first_choice = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .ok_or_else(|| TransformError::Malformed("response has no choices".to_string()))?;

    let text = first_choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::trim)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(TransformError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl TextTransform for LlmClient {
    async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError> {
        let body = self.build_request(request);

        #[cfg(feature = "debug-logs")]
        info!("Using chat prompt:\n{:?}", body.messages);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            "Requesting completion with {} messages in prompt",
            body.messages.len()
        );

        let response = self
            .http
            .post(&self.url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransformError::Http(format!("Completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(TransformError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| TransformError::Malformed(format!("Failed to parse response: {e}")))?;

        let text = extract_completion_text(&response_json)?;
        debug!("Completion returned {} characters", text.chars().count());
        Ok(text)
    }
}
