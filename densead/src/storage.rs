//! Hybrid inline/heap element buffer backing run-time sized
//! evaluations.
//!
//! [`FastSmallVector`] keeps up to `INLINE` elements inside the value
//! itself and only allocates when a larger buffer is requested.
//! Cloning duplicates the elements in either mode; moving an instance
//! that spilled to the heap transfers the allocation without touching
//! the elements.

use core::ops::{Deref, DerefMut, Index, IndexMut};
use core::slice::SliceIndex;

use smallvec::SmallVec;

/// Default inline capacity, in elements, of a dynamic evaluation's
/// buffer. One slot holds the value, the rest hold derivatives.
pub const DEFAULT_INLINE_CAPACITY: usize = 16;

/// A fixed-length element buffer with small-buffer optimisation.
///
/// The length is chosen at construction. It only changes through
/// [`resize`](Self::resize).
///
/// ```
/// use densead::storage::FastSmallVector;
///
/// let small = FastSmallVector::<f64, 4>::from_elem(0.0, 3);
/// assert!(!small.spilled());
///
/// let large = FastSmallVector::<f64, 4>::from_elem(0.0, 9);
/// assert!(large.spilled());
/// assert_eq!(large.len(), 9);
/// ```
#[derive(Clone, PartialEq)]
pub struct FastSmallVector<T, const INLINE: usize> {
    data: SmallVec<[T; INLINE]>,
}

impl<T: Copy, const INLINE: usize> FastSmallVector<T, INLINE> {
    /// Creates a buffer of `len` copies of `elem`.
    #[inline]
    pub fn from_elem(elem: T, len: usize) -> Self {
        if len > INLINE {
            tracing::trace!(len, inline = INLINE, "derivative buffer spills to the heap");
        }
        Self {
            data: SmallVec::from_elem(elem, len),
        }
    }

    /// Creates a buffer holding a copy of `elements`.
    #[inline]
    pub fn from_slice(elements: &[T]) -> Self {
        if elements.len() > INLINE {
            tracing::trace!(
                len = elements.len(),
                inline = INLINE,
                "derivative buffer spills to the heap"
            );
        }
        Self {
            data: SmallVec::from_slice(elements),
        }
    }

    /// Changes the length to `len`, filling new slots with `elem`.
    pub fn resize(&mut self, len: usize, elem: T) {
        if len > INLINE && !self.data.spilled() {
            tracing::trace!(len, inline = INLINE, "derivative buffer spills to the heap");
        }
        self.data.resize(len, elem);
    }
}

impl<T, const INLINE: usize> FastSmallVector<T, INLINE> {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `true` when the elements live on the heap.
    #[inline]
    pub fn spilled(&self) -> bool {
        self.data.spilled()
    }

    /// The elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// The elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }
}

impl<T, const INLINE: usize> Default for FastSmallVector<T, INLINE> {
    fn default() -> Self {
        Self {
            data: SmallVec::new(),
        }
    }
}

impl<T: core::fmt::Debug, const INLINE: usize> core::fmt::Debug for FastSmallVector<T, INLINE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<T, const INLINE: usize> Deref for FastSmallVector<T, INLINE> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const INLINE: usize> DerefMut for FastSmallVector<T, INLINE> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>, const INLINE: usize> Index<I> for FastSmallVector<T, INLINE> {
    type Output = I::Output;

    #[inline]
    fn index(&self, idx: I) -> &I::Output {
        &self.data[idx]
    }
}

impl<T, I: SliceIndex<[T]>, const INLINE: usize> IndexMut<I> for FastSmallVector<T, INLINE> {
    #[inline]
    fn index_mut(&mut self, idx: I) -> &mut I::Output {
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_inline_up_to_capacity() {
        let buf = FastSmallVector::<f64, 4>::from_elem(1.0, 4);
        assert!(!buf.spilled());
        assert_eq!(buf.as_slice(), &[1.0; 4]);
    }

    #[test]
    fn spills_beyond_capacity() {
        let buf = FastSmallVector::<f64, 4>::from_elem(2.0, 5);
        assert!(buf.spilled());
        assert_eq!(buf.len(), 5);
        assert!(buf.iter().all(|&x| x == 2.0));
    }

    #[test]
    fn clone_duplicates_inline_and_heap_contents() {
        let mut inline = FastSmallVector::<f64, 4>::from_slice(&[1.0, 2.0]);
        let copy = inline.clone();
        inline[0] = 10.0;
        assert_eq!(copy.as_slice(), &[1.0, 2.0]);

        let mut heap = FastSmallVector::<f64, 2>::from_slice(&[1.0, 2.0, 3.0]);
        let copy = heap.clone();
        heap[2] = 30.0;
        assert!(copy.spilled());
        assert_eq!(copy.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn move_keeps_heap_allocation() {
        let heap = FastSmallVector::<f64, 2>::from_slice(&[1.0, 2.0, 3.0]);
        let ptr = heap.as_slice().as_ptr();
        let moved = heap;
        assert_eq!(moved.as_slice().as_ptr(), ptr);
        assert_eq!(moved.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn resize_grows_and_shrinks() {
        let mut buf = FastSmallVector::<f64, 3>::from_elem(0.0, 2);
        buf.resize(6, 7.0);
        assert!(buf.spilled());
        assert_eq!(buf.as_slice(), &[0.0, 0.0, 7.0, 7.0, 7.0, 7.0]);

        buf.resize(1, 0.0);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn zero_capacity_always_spills_when_non_empty() {
        let buf = FastSmallVector::<f64, 0>::from_elem(0.0, 1);
        assert!(buf.spilled());
        assert!(FastSmallVector::<f64, 0>::default().is_empty());
    }

    #[test]
    #[should_panic]
    fn out_of_range_index_panics() {
        let buf = FastSmallVector::<f64, 4>::from_elem(0.0, 2);
        let _ = buf[2];
    }
}
