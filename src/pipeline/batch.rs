//! Fixed-size batch planning over the record sequence.
//!
//! Batches are contiguous, non-overlapping slices cut every `batch_size`
//! records, walking the sequence left to right; the last batch may be
//! shorter. Slice chunking gives the partition invariants (every record
//! exactly once, original order, no aliasing between batches) by
//! construction.

use std::slice::{Chunks, ChunksMut};

/// Default number of records per completion request.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Split records into batches of at most `batch_size`.
///
/// `batch_size` must be positive.
pub fn plan<T>(records: &[T], batch_size: usize) -> Chunks<'_, T> {
    records.chunks(batch_size)
}

/// Like [`plan`], but yields mutable batches for in-place annotation.
pub fn plan_mut<T>(records: &mut [T], batch_size: usize) -> ChunksMut<'_, T> {
    records.chunks_mut(batch_size)
}

/// Number of batches [`plan`] produces for `total` records.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size)
}
