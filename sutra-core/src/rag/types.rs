/// A sparse weighted vector over the vocabulary.
///
/// Entries are `(dimension, weight)` pairs sorted by dimension with no
/// duplicates and no zero weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Builds a vector from entries already sorted by dimension.
    pub(crate) fn from_sorted(entries: Vec<(usize, f32)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    /// Number of non-zero dimensions.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Scales the vector to unit length. A zero vector stays zero.
    pub(crate) fn normalize(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let (a, b) = (&self.entries, &other.entries);
        let mut sum = 0.0;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// One ranked page.
///
/// Scores are cosine similarities, in `[0.0, 1.0]` since TF-IDF weights are
/// never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub page_index: usize,
    pub score: f32,
}

/// The outcome of one retrieval: ranked pages and the joined context text.
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    pub results: Vec<SearchResult>,
    pub context: String,
}

impl Retrieval {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The best-ranked result, if any.
    pub fn top(&self) -> Option<&SearchResult> {
        self.results.first()
    }
}
