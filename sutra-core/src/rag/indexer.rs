//! TF-IDF vector space over the pages of a document.
//!
//! This module provides functionality to:
//! - Tokenize text into lowercase terms, dropping stop words
//! - Build a fixed vocabulary and smoothed IDF weights from a page set
//! - Project pages and queries into L2-normalised sparse vectors
//!
//! Weighting follows the usual smoothed scheme:
//!
//! ```text
//! idf(t)    = ln((1 + n) / (1 + df(t))) + 1
//! w(t, p)   = count(t, p) * idf(t)
//! ```
//!
//! where `n` is the number of pages and `df(t)` the number of pages containing
//! `t`. Each page vector is then scaled to unit length, so cosine similarity
//! reduces to a dot product.

use super::stopwords::is_stop_word;
use super::types::SparseVector;
use crate::document::Page;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while building the vector space.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("Cannot build an index from an empty page sequence")]
    Empty,

    #[error("No indexable terms remain after stop-word removal")]
    EmptyVocabulary,
}

/// Result type for indexing operations.
pub type Result<T> = std::result::Result<T, IndexError>;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Two or more word characters; single letters are never terms.
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

/// Splits text into lowercase, non-stop-word terms in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|term| !is_stop_word(term))
        .map(str::to_string)
        .collect()
}

fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// An immutable TF-IDF vector space built from one page set.
///
/// The vocabulary is fixed at build time. Projecting a query never extends
/// it: unknown terms simply carry no weight.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpace {
    /// Term to dimension; dimensions follow the terms' sorted order.
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
    page_vectors: Vec<SparseVector>,
}

impl VectorSpace {
    /// Builds the vector space for `pages`.
    ///
    /// Deterministic: the same pages always produce the same vocabulary and
    /// the same vectors.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Empty`] if `pages` is empty
    /// - [`IndexError::EmptyVocabulary`] if no page has any non-stop-word term
    pub fn build(pages: &[Page]) -> Result<Self> {
        if pages.is_empty() {
            return Err(IndexError::Empty);
        }

        let counts: Vec<HashMap<String, u32>> =
            pages.iter().map(|page| term_counts(page.text())).collect();

        let mut document_frequency: BTreeMap<&str, u32> = BTreeMap::new();
        for page_counts in &counts {
            for term in page_counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(IndexError::EmptyVocabulary);
        }

        let n = pages.len() as f32;
        let idf: Vec<f32> = document_frequency
            .values()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();
        let vocabulary: BTreeMap<String, usize> = document_frequency
            .keys()
            .enumerate()
            .map(|(dim, term)| (term.to_string(), dim))
            .collect();

        let page_vectors = counts
            .iter()
            .map(|page_counts| weigh(&vocabulary, &idf, page_counts))
            .collect();

        debug!(
            pages = pages.len(),
            dimensions = vocabulary.len(),
            "Built TF-IDF vector space"
        );

        Ok(Self {
            vocabulary,
            idf,
            page_vectors,
        })
    }

    /// Projects free text into this space using the existing vocabulary.
    pub fn project(&self, text: &str) -> SparseVector {
        weigh(&self.vocabulary, &self.idf, &term_counts(text))
    }

    /// Number of dimensions, i.e. the vocabulary size.
    pub fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// IDF weight of a term, or `None` if it is out of vocabulary.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&dim| self.idf[dim])
    }

    pub fn page_vectors(&self) -> &[SparseVector] {
        &self.page_vectors
    }

    pub fn page_count(&self) -> usize {
        self.page_vectors.len()
    }
}

fn weigh(
    vocabulary: &BTreeMap<String, usize>,
    idf: &[f32],
    counts: &HashMap<String, u32>,
) -> SparseVector {
    let mut entries: Vec<(usize, f32)> = counts
        .iter()
        .filter_map(|(term, &count)| {
            vocabulary
                .get(term)
                .map(|&dim| (dim, count as f32 * idf[dim]))
        })
        .collect();
    entries.sort_unstable_by_key(|&(dim, _)| dim);
    SparseVector::from_sorted(entries).normalize()
}
