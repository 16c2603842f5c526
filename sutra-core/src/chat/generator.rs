//! Streamed answer generation.
//!
//! [`AnswerGenerator`] sends the grounding prompt to a [`Provider`] and
//! wraps the fragment stream in an [`AnswerStream`], which yields the
//! cumulative answer after every fragment so a caller can redraw partial
//! output.

use super::prompt::PromptTemplate;
use crate::config::{Config, LlmConfig};
use crate::provider::{ChatRequest, Provider, ProviderError, TextStream};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while generating an answer.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Completion parameters, fixed for the lifetime of a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl From<&LlmConfig> for GenerationSettings {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            model: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            top_p: llm.top_p,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

/// Builds grounded prompts and streams answers from a provider.
#[derive(Clone)]
pub struct AnswerGenerator {
    provider: Arc<dyn Provider>,
    settings: GenerationSettings,
    prompt: PromptTemplate,
}

impl AnswerGenerator {
    pub fn new(
        provider: Arc<dyn Provider>,
        settings: GenerationSettings,
        prompt: PromptTemplate,
    ) -> Self {
        Self {
            provider,
            settings,
            prompt,
        }
    }

    /// Generator using the `llm` and `persona` sections of `config`.
    pub fn from_config(provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self::new(
            provider,
            GenerationSettings::from(&config.llm),
            PromptTemplate::new(config.persona.clone()),
        )
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// The exact request [`generate`](Self::generate) sends.
    pub fn build_request(&self, question: &str, context: &str) -> ChatRequest {
        ChatRequest::new(&self.settings.model, self.prompt.messages(question, context))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_top_p(self.settings.top_p)
    }

    /// Starts generating an answer to `question` from `context`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the request cannot be started
    /// (missing credential, unreachable service, rejected request). Failures
    /// after that arrive as the last item of the returned stream.
    pub async fn generate(
        &self,
        question: &str,
        context: &str,
    ) -> Result<AnswerStream, GenerationError> {
        let request = self.build_request(question, context);
        debug!(
            provider = self.provider.name(),
            model = %request.model,
            context_chars = context.len(),
            "Starting answer generation"
        );

        let fragments = self.provider.chat_stream(request).await.map_err(|e| {
            warn!(error = %e, "Answer generation failed to start");
            GenerationError::from(e)
        })?;

        Ok(AnswerStream::new(fragments))
    }
}

/// A generated answer arriving in pieces.
///
/// Each `Ok` item is the whole answer so far; every item extends the
/// previous one. The stream is finite and cannot be restarted. An `Err` item
/// is always the last one.
pub struct AnswerStream {
    fragments: TextStream,
    text: String,
    finished: bool,
}

impl AnswerStream {
    pub fn new(fragments: TextStream) -> Self {
        Self {
            fragments,
            text: String::new(),
            finished: false,
        }
    }

    /// The answer accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Drives the stream to completion and returns the full answer.
    pub async fn collect_text(mut self) -> Result<String, GenerationError> {
        while let Some(item) = self.next().await {
            item?;
        }
        Ok(self.text)
    }
}

impl Stream for AnswerStream {
    type Item = Result<String, GenerationError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        loop {
            match this.fragments.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(fragment))) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    this.text.push_str(&fragment);
                    return Poll::Ready(Some(Ok(this.text.clone())));
                }
                Poll::Ready(Some(Err(e))) => {
                    warn!(error = %e, received = this.text.len(), "Answer stream failed");
                    this.finished = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => {
                    debug!(chars = this.text.len(), "Answer stream complete");
                    this.finished = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}
