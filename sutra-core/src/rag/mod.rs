//! Retrieval Augmented Generation (RAG) over a single document.
//!
//! # Overview
//!
//! RAG combines:
//! 1. **Retrieval**: finding the pages of the reference document most relevant to a question
//! 2. **Augmentation**: adding those pages as context to the LLM prompt
//! 3. **Generation**: the LLM answers using only that context
//!
//! # Architecture
//!
//! - [`RagEngine`]: owns the loaded document and its vector space
//! - [`indexer`]: tokenisation and the TF-IDF [`VectorSpace`]
//! - [`retriever`]: cosine ranking of pages against a query
//!
//! # How It Works
//!
//! 1. **Indexing Phase** (once per document):
//!    - Every page is tokenised and stop words removed
//!    - A vocabulary and IDF weights are derived from all pages
//!    - Each page becomes a unit-length TF-IDF vector
//!
//! 2. **Retrieval Phase** (per question):
//!    - The question is projected with the same vocabulary
//!    - Pages are ranked by cosine similarity
//!    - The top pages are joined into a context string
//!
//! 3. **Generation Phase** (handled by the chat module)

pub mod indexer;
pub mod retriever;
mod stopwords;
mod types;

pub use indexer::{tokenize, IndexError, VectorSpace};
pub use retriever::{retrieve, PAGE_SEPARATOR};
pub use stopwords::{is_stop_word, STOP_WORDS};
pub use types::{Retrieval, SearchResult, SparseVector};

use crate::document::{Document, Page};
use std::sync::Arc;
use tracing::{debug, info};

/// Default number of pages retrieved per question.
pub const DEFAULT_TOP_N: usize = 3;

/// A loaded document together with its vector space.
///
/// The vector space is built exactly once, in [`RagEngine::new`], and shared
/// immutably afterwards. Queries never rebuild or extend it, so an engine can
/// be cloned cheaply and handed to several sessions.
///
/// # Example
///
/// ```no_run
/// # use sutra_core::{document, rag::RagEngine};
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let document = document::load("gita.pdf")?;
/// let engine = RagEngine::new(document)?;
///
/// let retrieval = engine.retrieve("What is my duty?", 3);
/// println!("{}", retrieval.context);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RagEngine {
    document: Arc<Document>,
    space: Arc<VectorSpace>,
}

impl RagEngine {
    /// Indexes `document`.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] if the pages yield no vocabulary.
    pub fn new(document: Document) -> Result<Self, IndexError> {
        let space = VectorSpace::build(document.pages())?;
        info!(
            source = document.source(),
            pages = document.len(),
            dimensions = space.dimensions(),
            "Indexed document"
        );

        Ok(Self {
            document: Arc::new(document),
            space: Arc::new(space),
        })
    }

    /// Ranks pages against `query` and joins the best `top_n` into a context.
    pub fn retrieve(&self, query: &str, top_n: usize) -> Retrieval {
        let retrieval = retrieve(&self.space, self.document.pages(), query, top_n);
        for (rank, result) in retrieval.results.iter().enumerate() {
            debug!(
                rank = rank + 1,
                page = result.page_index,
                score = result.score,
                "Retrieved page"
            );
        }
        retrieval
    }

    /// Context string for `query`; see [`RagEngine::retrieve`].
    pub fn retrieve_context(&self, query: &str, top_n: usize) -> String {
        self.retrieve(query, top_n).context
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.document.page(index)
    }

    pub fn vector_space(&self) -> &Arc<VectorSpace> {
        &self.space
    }

    /// Number of indexed pages.
    pub fn count(&self) -> usize {
        self.document.len()
    }
}
