//! Slice shared by every barrier worker, written in disjoint ranges.
//!
//! Between two barriers each element is either written by exactly one
//! thread or only read by any number of threads, never both. The work-range
//! partition decides who writes what; the barrier orders one phase's writes
//! before the next phase's reads.

use std::marker::PhantomData;
use std::ops::Range;

pub(crate) struct SharedSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: access goes through the unsafe methods below, whose callers uphold
// the phase discipline described in the module docs.
unsafe impl<T: Send> Send for SharedSlice<'_, T> {}
unsafe impl<T: Send + Sync> Sync for SharedSlice<'_, T> {}

impl<'a, T> SharedSlice<'a, T> {
    pub(crate) fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// Exclusive access to `range`.
    ///
    /// # Safety
    ///
    /// Until the returned slice is dropped, no other thread may hold a
    /// reference overlapping `range`, and the caller must not create one.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn range_mut(&self, range: Range<usize>) -> &mut [T] {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "range {range:?} out of bounds for length {}",
            self.len
        );
        // SAFETY: in bounds per the assert; exclusivity is the caller's contract.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.add(range.start), range.len()) }
    }

    /// Shared access to the whole slice.
    ///
    /// # Safety
    ///
    /// Until the returned slice is dropped, no thread may write any element.
    pub(crate) unsafe fn all(&self) -> &[T] {
        // SAFETY: the pointer and length come from a live `&'a mut [T]`.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

#[cfg(test)]
mod tests {
    use super::SharedSlice;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn disjoint_writes_are_visible_after_the_barrier() {
        let mut data = vec![0usize; 8];
        let shared = SharedSlice::new(&mut data);
        let barrier = Barrier::new(2);
        thread::scope(|scope| {
            for t in 0..2 {
                let (shared, barrier) = (&shared, &barrier);
                scope.spawn(move || {
                    {
                        // SAFETY: thread t owns [4t, 4t + 4) in the write phase.
                        let mine = unsafe { shared.range_mut(4 * t..4 * t + 4) };
                        mine.iter_mut().for_each(|v| *v = t + 1);
                    }
                    barrier.wait();
                    // SAFETY: no writes happen after the barrier.
                    let all = unsafe { shared.all() };
                    assert_eq!(all.iter().sum::<usize>(), 4 + 8);
                });
            }
        });
        assert_eq!(data, vec![1, 1, 1, 1, 2, 2, 2, 2]);
    }
}
