use std::marker::PhantomData;

use crate::offsets::Offsets;

/// Iterator over references to the elements of a strided tensor, in
/// row-major index order.
#[derive(Clone, Debug)]
pub struct StridedIter<'a, T> {
    data: &'a [T],
    offsets: Offsets,
}

impl<'a, T> StridedIter<'a, T> {
    /// Create an iterator which yields `data[offset]` for each offset.
    ///
    /// Panics during iteration if an offset is outside of `data`.
    pub(crate) fn new(data: &'a [T], offsets: Offsets) -> Self {
        StridedIter { data, offsets }
    }
}

impl<'a, T> Iterator for StridedIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let offset = self.offsets.next()?;
        Some(&self.data[offset])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<T> ExactSizeIterator for StridedIter<'_, T> {}

/// Iterator over mutable references to the elements of a strided tensor, in
/// row-major index order.
#[derive(Debug)]
pub struct StridedIterMut<'a, T> {
    ptr: *mut T,
    len: usize,
    offsets: Offsets,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> StridedIterMut<'a, T> {
    /// Create an iterator which yields `data[offset]` for each offset.
    ///
    /// # Safety
    ///
    /// `offsets` must never yield the same offset twice.
    pub(crate) unsafe fn new(data: &'a mut [T], offsets: Offsets) -> Self {
        StridedIterMut {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            offsets,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for StridedIterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        let offset = self.offsets.next()?;
        assert!(offset < self.len, "offset {} out of bounds", offset);
        // Safety: `offset` is in bounds and offsets are unique, so no two
        // returned references alias.
        Some(unsafe { &mut *self.ptr.add(offset) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<T> ExactSizeIterator for StridedIterMut<'_, T> {}

// Safety: The iterator behaves like `&mut [T]`.
unsafe impl<T: Send> Send for StridedIterMut<'_, T> {}
unsafe impl<T: Sync> Sync for StridedIterMut<'_, T> {}
