//! Azure OpenAI completion client.
//!
//! The pipeline depends on exactly one external capability: obtain a
//! completion for a prompt. [`CompletionClient`] is that seam;
//! [`AzureOpenAiClient`] is the real implementation and
//! [`MockCompletionClient`] stands in for it in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::pipeline::prompt::SYSTEM_PROMPT;

/// Default request timeout for completion calls.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Cannot reach Azure OpenAI at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Azure OpenAI returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    ResponseParsing(String),

    #[error("Completion response contained no choices")]
    EmptyChoices,
}

/// The sole external capability the annotation pipeline depends on.
pub trait CompletionClient {
    /// Obtain a completion for `prompt` at the given sampling temperature.
    fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError>;
}

/// HTTP client for an Azure OpenAI chat-completion deployment.
pub struct AzureOpenAiClient {
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    max_tokens: u32,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl AzureOpenAiClient {
    /// Build a client from loaded configuration with the default timeout.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_timeout(config, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(config: &AppConfig, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: config.azure_openai_endpoint.trim_end_matches('/').to_string(),
            deployment: config.azure_openai_deployment.clone(),
            api_version: config.azure_openai_api_version.clone(),
            api_key: config.azure_openai_key.clone(),
            max_tokens: config.max_tokens,
            timeout_secs,
            client,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

/// Request body for the chat-completions endpoint.
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from the chat-completions endpoint.
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl CompletionClient for AzureOpenAiClient {
    fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    CompletionError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    CompletionError::Timeout(self.timeout_secs)
                } else {
                    CompletionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| CompletionError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyChoices)
    }
}

/// Mock completion client for tests — returns a configured response, or
/// fails every call when built with [`MockCompletionClient::failing`].
pub struct MockCompletionClient {
    response: String,
    fail: bool,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            response: String::new(),
            fail: true,
        }
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, CompletionError> {
        if self.fail {
            return Err(CompletionError::Connection("mock endpoint".to_string()));
        }
        Ok(self.response.clone())
    }
}
