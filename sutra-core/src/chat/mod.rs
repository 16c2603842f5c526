//! Answer generation and conversation state.

pub mod generator;
pub mod history;
pub mod manager;
pub mod prompt;

pub use generator::{AnswerGenerator, AnswerStream, GenerationError, GenerationSettings};
pub use history::{Conversation, Speaker, Turn};
pub use manager::{ChatError, ChatManager, USER_LABEL};
pub use prompt::{PromptTemplate, CONTEXT_DELIMITER};
