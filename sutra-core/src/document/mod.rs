//! Loading the reference document as a sequence of pages.
//!
//! Two source formats are understood:
//! - PDF (by extension), extracted page by page with `pdf-extract`
//! - plain text, where a form feed (`\x0C`) separates pages
//!
//! Pages without any text are dropped, so a [`Page`]'s index is its position
//! among the text-bearing pages. A document that ends up with no pages at all
//! is a [`LoadError::NoText`]: nothing downstream can run without one.

mod pdf;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Page separator for plain-text documents.
pub const FORM_FEED: char = '\x0C';

/// Errors that can occur while loading a document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to extract PDF text: {0}")]
    Pdf(String),

    #[error("Unreadable document format: {0}")]
    Format(String),

    #[error("No text extracted from {0}. It might be an image-based PDF.")]
    NoText(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// One unit of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    index: usize,
    text: String,
}

impl Page {
    /// 0-based position within the loaded document.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A loaded document: a non-empty, ordered sequence of pages.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    pages: Vec<Page>,
}

impl Document {
    /// Builds a document from raw page texts.
    ///
    /// Blank pages are skipped and the remaining ones renumbered from zero.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NoText`] if no page carries any text.
    pub fn from_pages<I, S>(source: impl Into<String>, pages: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = source.into();
        let pages: Vec<Page> = pages
            .into_iter()
            .map(Into::<String>::into)
            .filter(|text| !text.trim().is_empty())
            .enumerate()
            .map(|(index, text)| Page { index, text })
            .collect();

        if pages.is_empty() {
            return Err(LoadError::NoText(source));
        }

        Ok(Self { source, pages })
    }

    /// Builds a document from plain text, splitting pages on form feeds.
    pub fn from_text(source: impl Into<String>, text: &str) -> Result<Self> {
        Self::from_pages(source, text.split(FORM_FEED))
    }

    /// Where the document came from, usually a file path.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false for a constructed document; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Loads the document at `path`.
///
/// Files ending in `.pdf` (any case) go through the PDF extractor; anything
/// else is read as UTF-8 text with form-feed page breaks.
///
/// # Errors
///
/// - [`LoadError::NotFound`] if the path does not exist
/// - [`LoadError::Io`] if it cannot be read
/// - [`LoadError::Pdf`] if PDF extraction fails
/// - [`LoadError::Format`] if a text document is not valid UTF-8
/// - [`LoadError::NoText`] if no page has extractable text
pub fn load(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let source = path.display().to_string();
    let bytes = std::fs::read(path)?;
    debug!(path = %source, bytes = bytes.len(), "Read document source");

    let document = if is_pdf(path) {
        Document::from_pages(&source, pdf::extract_pages(&bytes)?)?
    } else {
        let text = String::from_utf8(bytes)
            .map_err(|e| LoadError::Format(format!("{source} is not UTF-8 text ({e})")))?;
        Document::from_text(&source, &text)?
    };

    info!(path = %source, pages = document.len(), "Loaded document");
    Ok(document)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
