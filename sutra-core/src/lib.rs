//! sutra-core - Ask questions of a single reference document
//!
//! Provides the components of the question-answering pipeline:
//! - Document loading (PDF or form-feed paginated text)
//! - TF-IDF indexing and cosine retrieval of pages
//! - Grounded, streamed answer generation via a completion provider
//! - The per-session conversation transcript
//!
//! ## Primary API
//!
//! Most users want [`ChatManager`], which ties the pieces together.

// Public modules
pub mod chat;
pub mod config;
pub mod document;
pub mod provider;
pub mod rag;

// Public exports
pub use chat::{
    AnswerGenerator, AnswerStream, ChatError, ChatManager, Conversation, GenerationError, Speaker,
    Turn,
};
pub use config::{Config, ConfigError};
pub use document::{Document, LoadError, Page};
pub use rag::{IndexError, RagEngine, Retrieval, SearchResult, VectorSpace};

// Provider exports
pub use provider::{ChatRequest, Message, OpenAiProvider, Provider, ProviderError, TextStream};
