/*!
 * Batching of text fragments.
 *
 * Fragments are grouped into contiguous slices so each translation request
 * stays under the configured size ceiling. Position inside a batch is the only
 * thing that ties a translated segment back to its fragment.
 */

use super::extract::{SourceRef, TextFragment};

/// An ordered, size-bounded slice of fragments
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Zero-based position among the batches of one sheet
    pub index: usize,
    pub fragments: &'a [TextFragment],
}

impl<'a> Batch<'a> {
    /// Cleaned texts in request order
    pub fn texts(&self) -> Vec<String> {
        self.fragments.iter().map(|f| f.cleaned_text.clone()).collect()
    }

    pub fn source_refs(&self) -> Vec<SourceRef> {
        self.fragments.iter().map(|f| f.source_ref.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Split `fragments` into contiguous batches of at most `max_size` items.
/// A ceiling of zero is treated as one.
pub fn split_into_batches(fragments: &[TextFragment], max_size: usize) -> Vec<Batch<'_>> {
    fragments.chunks(max_size.max(1))
        .enumerate()
        .map(|(index, fragments)| Batch { index, fragments })
        .collect()
}
