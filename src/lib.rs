//! sutra - Ask questions of a single reference document
//!
//! This is the convenience wrapper crate that re-exports the sutra
//! components.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! sutra = "0.1"
//! ```
//!
//! ```no_run
//! use sutra::prelude::*;
//!
//! # async fn run() -> Result<(), ChatError> {
//! let mut manager = ChatManager::open(Config::default())?;
//! let answer = manager.query("What is my duty?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

// Re-export core
pub use sutra_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use sutra_core::{
        ChatError, ChatManager, Config, Document, Provider, RagEngine, Retrieval, Speaker, Turn,
    };
}
