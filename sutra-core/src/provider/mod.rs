//! Completion provider abstraction layer.
//!
//! This module defines a common interface for hosted chat-completion
//! services that stream their output, plus an implementation for
//! OpenAI-compatible APIs.

mod types;
pub mod openai;
pub mod sse;

// Re-export common types
pub use types::{
    ChatRequest,
    Message,
    Provider,
    ProviderError,
    Result,
    TextStream,
};

// Re-export provider implementations
pub use openai::OpenAiProvider;
