//! Fixed-size batching shared by entity detection and bulk writes.

use std::num::NonZeroUsize;

/// A contiguous, bounded view over a larger sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a, T> {
    /// Position of the first item within the full sequence.
    pub offset: usize,
    pub items: &'a [T],
}

impl<'a, T> Batch<'a, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split `items` into ordered, non-overlapping batches of at most `max_batch_size`.
///
/// Yields `ceil(N / B)` batches; every batch but the last holds exactly `B`
/// items. An empty input yields no batches.
pub fn batches<T>(items: &[T], max_batch_size: NonZeroUsize) -> impl Iterator<Item = Batch<'_, T>> {
    let size = max_batch_size.get();
    items
        .chunks(size)
        .enumerate()
        .map(move |(i, chunk)| Batch {
            offset: i * size,
            items: chunk,
        })
}

/// Number of batches `batches` will yield for `len` items.
pub fn batch_count(len: usize, max_batch_size: NonZeroUsize) -> usize {
    len.div_ceil(max_batch_size.get())
}
