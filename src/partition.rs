//! Deterministic work partitioning across a fixed number of threads.
//!
//! Every phase splits its index domain with the same floor-based formula:
//! thread `t` of `T` owns `[t*N/T, (t+1)*N/T)`. The ranges of all threads are
//! contiguous, disjoint and cover `[0, N)` exactly once. When `T > N` some
//! ranges are empty and those threads skip the phase.

use std::ops::Range;

/// Contiguous index interval owned by one thread for one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkRange {
    /// First index owned (inclusive).
    pub start: usize,
    /// One past the last index owned.
    pub end: usize,
}

impl WorkRange {
    /// Computes the range of thread `thread` among `threads` over `len` items.
    ///
    /// Uses exact integer floor division so adjacent threads always agree on
    /// their shared boundary. `threads` must be non-zero; `thread >= threads`
    /// yields an empty range at the end of the domain.
    pub fn for_thread(thread: usize, threads: usize, len: usize) -> Self {
        debug_assert!(threads > 0, "thread count must be non-zero");
        let threads = threads.max(1);
        let start = floor_share(thread, threads, len).min(len);
        let end = floor_share(thread.saturating_add(1), threads, len).min(len);
        Self { start, end }
    }

    /// Returns the number of indices in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true when the thread has nothing to do in this phase.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns true if `index` falls inside the range.
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// Returns the range scaled by `factor`, e.g. grid rows to pixel rows.
    pub fn scaled(&self, factor: usize) -> Range<usize> {
        self.start * factor..self.end * factor
    }

    /// Returns the range as a standard iterator.
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<WorkRange> for Range<usize> {
    fn from(value: WorkRange) -> Self {
        value.start..value.end
    }
}

impl IntoIterator for WorkRange {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..self.end
    }
}

// Widened so `t * N` never overflows for any usize inputs.
fn floor_share(thread: usize, threads: usize, len: usize) -> usize {
    let share = thread as u128 * len as u128 / threads as u128;
    usize::try_from(share).unwrap_or(usize::MAX)
}

/// Returns the ranges of every thread, in thread order.
pub fn partition(threads: usize, len: usize) -> Vec<WorkRange> {
    (0..threads)
        .map(|thread| WorkRange::for_thread(thread, threads, len))
        .collect()
}

/// Splits the front of `slice` into one chunk per range, `unit` elements per
/// index.
///
/// `ranges` must be contiguous and start at 0, as returned by [`partition`];
/// elements past the last range are not handed out. Panics if `slice` is
/// shorter than the ranges require.
pub fn split_mut<'a, T>(
    mut slice: &'a mut [T],
    ranges: &[WorkRange],
    unit: usize,
) -> Vec<&'a mut [T]> {
    let mut chunks = Vec::with_capacity(ranges.len());
    let mut next = 0;
    for range in ranges {
        debug_assert_eq!(range.start, next, "ranges must be contiguous");
        next = range.end;
        let (head, tail) = std::mem::take(&mut slice).split_at_mut(range.len() * unit);
        chunks.push(head);
        slice = tail;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::{partition, split_mut, WorkRange};

    #[test]
    fn single_thread_owns_everything() {
        let range = WorkRange::for_thread(0, 1, 17);
        assert_eq!(range, WorkRange { start: 0, end: 17 });
        assert_eq!(range.len(), 17);
    }

    #[test]
    fn uneven_split_uses_floor_boundaries() {
        let ranges = partition(3, 16);
        assert_eq!(
            ranges,
            vec![
                WorkRange { start: 0, end: 5 },
                WorkRange { start: 5, end: 10 },
                WorkRange { start: 10, end: 16 },
            ]
        );
    }

    #[test]
    fn surplus_threads_get_empty_ranges() {
        let ranges = partition(6, 2);
        let non_empty: Vec<_> = ranges.iter().filter(|r| !r.is_empty()).collect();
        assert_eq!(non_empty.len(), 2);
        assert!(ranges[0].is_empty());
        assert_eq!(ranges.last().map(|r| r.end), Some(2));
    }

    #[test]
    fn empty_domain_is_all_empty() {
        assert!(partition(4, 0).iter().all(WorkRange::is_empty));
    }

    #[test]
    fn split_mut_hands_out_owned_rows() {
        let mut data: Vec<u32> = (0..20).collect();
        let ranges = partition(3, 4);
        let chunks = split_mut(&mut data, &ranges, 4);
        let lens: Vec<_> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![4, 4, 8]);
        assert_eq!(chunks[2][0], 8);
        assert_eq!(data[16..], [16, 17, 18, 19]);
    }

    #[test]
    fn scaled_maps_grid_rows_to_pixel_rows() {
        let range = WorkRange { start: 2, end: 5 };
        assert_eq!(range.scaled(8), 16..40);
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }
}
