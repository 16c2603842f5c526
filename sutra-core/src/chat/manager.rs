//! Question-answering sessions over the reference document.
//!
//! # Turn Flow
//!
//! ```text
//! User Question → record turn → Retrieve pages → Generate (streamed) → record turn
//! ```
//!
//! # Streaming Behavior
//!
//! The answer arrives in fragments. The caller's callback sees the whole
//! answer so far after every fragment, so a display can simply be redrawn.

use super::generator::{AnswerGenerator, GenerationError};
use super::history::{Conversation, Speaker, Turn};
use crate::config::Config;
use crate::document::{self, LoadError};
use crate::provider::{OpenAiProvider, Provider};
use crate::rag::{IndexError, RagEngine, Retrieval};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Label used for the user's turns.
pub const USER_LABEL: &str = "You";

/// Errors surfaced by a chat session.
///
/// Loading and indexing errors only happen while opening a session and are
/// fatal to it. Generation errors affect a single turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Failed to load document: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to index document: {0}")]
    Index(#[from] IndexError),

    #[error("Failed to generate answer: {0}")]
    Generation(#[from] GenerationError),
}

pub type Result<T> = std::result::Result<T, ChatError>;

/// One user's question-answering session.
///
/// `ChatManager` owns the session's transcript. The [`RagEngine`] it queries
/// is built before the manager exists, so a session can never run against a
/// partially built index.
///
/// # Examples
///
/// ```no_run
/// use sutra_core::{ChatManager, Config};
///
/// # async fn example() -> Result<(), sutra_core::ChatError> {
/// let config = Config::load_or_default();
/// let mut manager = ChatManager::open(config)?;
///
/// let answer = manager.query("What is my duty?").await?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
pub struct ChatManager {
    config: Config,
    engine: RagEngine,
    generator: AnswerGenerator,
    history: Conversation,
}

impl ChatManager {
    /// Creates a session from an already indexed document and a provider.
    pub fn new(config: Config, engine: RagEngine, provider: Arc<dyn Provider>) -> Self {
        let generator = AnswerGenerator::from_config(provider, &config);
        let history = Conversation::new(USER_LABEL, config.persona.name.clone());
        Self {
            config,
            engine,
            generator,
            history,
        }
    }

    /// Loads and indexes the configured document and connects to the
    /// configured OpenAI-compatible service.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Load`] or [`ChatError::Index`] if the document is
    /// unusable.
    pub fn open(config: Config) -> Result<Self> {
        let document = document::load(&config.document.path)?;
        let engine = RagEngine::new(document)?;
        let provider: Arc<dyn Provider> = Arc::new(OpenAiProvider::new(&config));
        Ok(Self::new(config, engine, provider))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &RagEngine {
        &self.engine
    }

    /// Retrieves context for `question` without generating anything.
    pub fn retrieve(&self, question: &str) -> Retrieval {
        self.engine.retrieve(question, self.config.retrieval.top_n)
    }

    /// Asks a question and waits for the complete answer.
    ///
    /// See [`query_stream`](Self::query_stream).
    pub async fn query(&mut self, user_message: &str) -> Result<String> {
        self.query_stream(user_message, |_| {}).await
    }

    /// Asks a question, reporting the growing answer through `on_update`.
    ///
    /// Both the question and the outcome are recorded in the transcript. On
    /// failure the assistant turn holds `"Error: {cause}"` so the transcript
    /// stays readable, and the cause is returned as [`ChatError::Generation`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use sutra_core::{ChatManager, Config};
    /// # async fn example(mut manager: ChatManager) -> Result<(), sutra_core::ChatError> {
    /// let answer = manager.query_stream("What is the self?", |partial| {
    ///     print!("\r{partial}");
    /// }).await?;
    /// println!("\n\nFinal response: {answer}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn query_stream<F>(&mut self, user_message: &str, mut on_update: F) -> Result<String>
    where
        F: FnMut(&str) + Send,
    {
        self.history.append(Speaker::User, user_message);

        let retrieval = self.retrieve(user_message);
        info!(
            pages = ?retrieval.results.iter().map(|r| r.page_index).collect::<Vec<_>>(),
            "Retrieved context"
        );

        let outcome = self
            .stream_answer(user_message, &retrieval.context, &mut on_update)
            .await;

        match outcome {
            Ok(answer) => {
                self.history.append(Speaker::Assistant, answer.clone());
                Ok(answer)
            }
            Err(e) => {
                warn!(error = %e, "Answer generation failed");
                self.history.append(Speaker::Assistant, format!("Error: {e}"));
                Err(e.into())
            }
        }
    }

    async fn stream_answer<F>(
        &self,
        question: &str,
        context: &str,
        on_update: &mut F,
    ) -> std::result::Result<String, GenerationError>
    where
        F: FnMut(&str) + Send,
    {
        let mut answer = self.generator.generate(question, context).await?;
        let mut fragments = 0usize;

        while let Some(partial) = answer.next().await {
            let partial = partial?;
            fragments += 1;
            on_update(&partial);
        }

        debug!(fragments, "Answer complete");
        Ok(answer.text().to_string())
    }

    /// Snapshot of the transcript.
    pub fn history(&self) -> Vec<Turn> {
        self.history.read_all()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.history
    }
}
