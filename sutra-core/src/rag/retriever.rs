//! Ranking pages against a query.

use super::indexer::VectorSpace;
use super::types::{Retrieval, SearchResult};
use crate::document::Page;
use tracing::{debug, warn};

/// Separator placed between page texts in the joined context.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Returns the `top_n` pages most similar to `query`.
///
/// Results are ordered by descending cosine similarity; equal scores keep
/// page order. Asking for more pages than exist returns all of them. A
/// query that shares no term with the vocabulary scores zero everywhere and
/// yields the first `top_n` pages.
///
/// `pages` should be the page set `space` was built from. Pages beyond the
/// shorter of the two are never ranked.
pub fn retrieve(space: &VectorSpace, pages: &[Page], query: &str, top_n: usize) -> Retrieval {
    if space.page_count() != pages.len() {
        warn!(
            vectors = space.page_count(),
            pages = pages.len(),
            "Page set does not match the vector space"
        );
    }

    let query_vector = space.project(query);
    if query_vector.is_zero() {
        debug!(query, "Query has no in-vocabulary terms");
    }

    let mut results: Vec<SearchResult> = space
        .page_vectors()
        .iter()
        .zip(pages)
        .enumerate()
        .map(|(page_index, (vector, _))| SearchResult {
            page_index,
            score: vector.dot(&query_vector),
        })
        .collect();

    // Stable sort, so ties stay in page order.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_n);

    let context = results
        .iter()
        .filter_map(|result| pages.get(result.page_index))
        .map(Page::text)
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);

    Retrieval { results, context }
}
