//! Per-page PDF text extraction.

use super::{LoadError, Result};

/// Extracts the text of every page, in page order.
///
/// Image-only pages come back as empty strings; the caller decides what to
/// do with them.
pub(super) fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| LoadError::Pdf(e.to_string()))
}
