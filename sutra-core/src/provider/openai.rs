//! OpenAI-compatible provider implementation.
//!
//! This module provides an HTTP client for any service speaking the OpenAI
//! chat-completions protocol (Groq by default) and implements the Provider
//! trait on top of it.

use super::sse;
use super::types::*;
use crate::config::Config;
use async_trait::async_trait;
use tracing::debug;

/// OpenAI-compatible HTTP API provider.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    http_client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a provider from the `llm` section of `config`.
    ///
    /// The API key is read from the environment variable named by
    /// `llm.api_key_env`. A missing key is only reported when a request is
    /// made.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key(),
            api_key_env: config.llm.api_key_env.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Overrides the API key taken from the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<TextStream> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingApiKey(self.api_key_env.clone()))?;

        let url = self.completions_url();
        debug!(url = %url, model = %request.model, messages = request.messages.len(), "Sending chat request");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(ProviderError::Api {
                status: Some(status.as_u16()),
                message: error_text,
            });
        }

        Ok(sse::decode(response.bytes_stream()))
    }
}
