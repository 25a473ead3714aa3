//! Row-parallel iteration over flat buffers.
//!
//! Uses rayon when the `parallel` feature is enabled, the calling thread
//! otherwise. Each row is handed to exactly one call of `f`.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(row_index, row)` for every `row_len`-sized chunk of `data`.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_row<T, F>(data: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Calls `f(row_index, row)` for every `row_len`-sized chunk of `data` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_row<T, F>(data: &mut [T], row_len: usize, f: F)
where
    F: Fn(usize, &mut [T]),
{
    for (y, row) in data.chunks_mut(row_len).enumerate() {
        f(y, row);
    }
}
