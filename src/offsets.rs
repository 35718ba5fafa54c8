use crate::extents::{Shape, Stride, MAX_SHAPE};

/// Iterator over the element offsets of a strided layout, in row-major index
/// order.
///
/// Tracks the current index of each axis, advancing the innermost axis first
/// and carrying into outer axes.
#[derive(Clone, Debug)]
pub struct Offsets {
    shape: [usize; MAX_SHAPE],
    stride: [usize; MAX_SHAPE],
    index: [usize; MAX_SHAPE],
    dims: usize,
    offset: usize,
    remaining: usize,
}

impl Offsets {
    /// Create an iterator for a layout. Strides must be non-negative.
    pub fn new(shape: &Shape, stride: &Stride) -> Offsets {
        let mut offsets = Offsets {
            shape: [0; MAX_SHAPE],
            stride: [0; MAX_SHAPE],
            index: [0; MAX_SHAPE],
            dims: shape.dims(),
            offset: 0,
            remaining: shape.count(),
        };
        for axis in 0..shape.dims() {
            offsets.shape[axis] = shape[axis] as usize;
            offsets.stride[axis] = stride[axis] as usize;
        }
        offsets
    }
}

impl Iterator for Offsets {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self.offset;
        self.remaining -= 1;

        if self.remaining > 0 {
            for axis in (0..self.dims).rev() {
                self.index[axis] += 1;
                self.offset += self.stride[axis];
                if self.index[axis] < self.shape[axis] {
                    break;
                }
                self.offset -= self.stride[axis] * self.index[axis];
                self.index[axis] = 0;
            }
        }

        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Offsets {}

impl std::iter::FusedIterator for Offsets {}

#[cfg(test)]
mod tests {
    use super::Offsets;
    use crate::{Shape, Stride};

    fn offsets(shape: &[i64], stride: &[i64]) -> Vec<usize> {
        Offsets::new(&Shape::new(shape).unwrap(), &Stride::new(stride).unwrap()).collect()
    }

    #[test]
    fn test_offsets() {
        assert_eq!(offsets(&[2, 3], &[3, 1]), [0, 1, 2, 3, 4, 5]);
        assert_eq!(offsets(&[2, 3], &[1, 2]), [0, 2, 4, 1, 3, 5]);
        assert_eq!(offsets(&[3], &[4]), [0, 4, 8]);
        assert_eq!(offsets(&[2, 2], &[0, 1]), [0, 1, 0, 1]);
        assert_eq!(offsets(&[2, 1, 2], &[10, 99, 1]), [0, 1, 10, 11]);
        assert_eq!(offsets(&[], &[]), Vec::<usize>::new());
        assert_eq!(offsets(&[3, 0], &[1, 1]), Vec::<usize>::new());
    }

    #[test]
    fn test_len() {
        let iter = Offsets::new(&Shape::new(&[4, 5]).unwrap(), &Stride::new(&[5, 1]).unwrap());
        assert_eq!(iter.len(), 20);
    }
}
