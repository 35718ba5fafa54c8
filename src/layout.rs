//! Functions that inspect how a shape and stride map elements to memory.

use smallvec::SmallVec;

use crate::extents::{Shape, Stride, MAX_SHAPE};

/// Return true if elements of a tensor with a given shape and stride are
/// densely packed in row-major order.
///
/// Strides of size-1 axes do not affect the result, and a tensor with no
/// elements is contiguous.
pub fn is_contiguous(shape: &Shape, stride: &Stride) -> bool {
    if shape.is_empty() {
        return true;
    }
    let mut product = 1;
    for (size, stride) in shape.iter().zip(stride.iter()).rev() {
        if size == 1 {
            continue;
        }
        if stride != product {
            return false;
        }
        product *= size;
    }
    true
}

/// Return the number of elements between the first element and one past the
/// last addressable element, or zero if the tensor has no elements.
///
/// Returns `None` if a stride is negative or the result overflows.
pub fn span_len(shape: &Shape, stride: &Stride) -> Option<usize> {
    if shape.is_empty() {
        return Some(0);
    }
    shape
        .iter()
        .zip(stride.iter())
        .try_fold(1usize, |len, (size, stride)| {
            let stride = usize::try_from(stride).ok()?;
            (size as usize - 1)
                .checked_mul(stride)
                .and_then(|offset| len.checked_add(offset))
        })
}

/// Return true if multiple indices may map to the same element.
///
/// This is conservative. It can return true for layouts that do not overlap,
/// but never returns false for a layout that does.
pub fn may_have_internal_overlap(shape: &Shape, stride: &Stride) -> bool {
    if shape.is_empty() || is_contiguous(shape, stride) {
        return false;
    }

    let mut stride_shape: SmallVec<[(i64, i64); MAX_SHAPE]> = stride
        .iter()
        .zip(shape.iter())
        .filter(|&(_, size)| size > 1)
        .collect();
    stride_shape.sort_unstable();

    // Each stride must exceed the largest offset reachable using only the
    // axes with smaller strides.
    let mut max_offset = 0;
    for (stride, size) in stride_shape {
        if stride <= max_offset {
            return true;
        }
        max_offset += (size - 1) * stride;
    }
    false
}

/// Compute strides which address the same elements as `shape` and `stride`
/// with a different shape of equal element count.
///
/// Axes of the two shapes are matched into groups with equal products. Within
/// each group the old axes must be contiguous with respect to each other, and
/// the new axes are laid out inside the group with the stride of its innermost
/// old axis. Returns `None` if some group is not contiguous.
pub fn reshaped_stride(shape: &Shape, stride: &Stride, new_shape: &Shape) -> Option<Stride> {
    if shape.count() != new_shape.count() {
        return None;
    }
    if is_contiguous(shape, stride) || new_shape.is_empty() {
        return Some(Stride::from_contiguous_shape(new_shape));
    }

    // Size-1 axes never affect addressing, so drop them from the old layout.
    let old: SmallVec<[(i64, i64); MAX_SHAPE]> = shape
        .iter()
        .zip(stride.iter())
        .filter(|&(size, _)| size != 1)
        .collect();

    let mut new_stride = Stride::from_contiguous_shape(new_shape);
    let new_dims = new_shape.dims();
    let (mut oi, mut ni) = (0, 0);

    while oi < old.len() && ni < new_dims {
        let (mut old_prod, mut new_prod) = (old[oi].0, new_shape[ni]);
        let (mut oj, mut nj) = (oi + 1, ni + 1);
        while old_prod != new_prod {
            if new_prod < old_prod {
                new_prod *= new_shape[nj];
                nj += 1;
            } else {
                old_prod *= old[oj].0;
                oj += 1;
            }
        }

        for k in oi..oj - 1 {
            if old[k].1 != old[k + 1].0 * old[k + 1].1 {
                return None;
            }
        }

        let mut inner = old[oj - 1].1;
        for k in (ni..nj).rev() {
            new_stride.set(k, inner);
            inner *= new_shape[k];
        }

        oi = oj;
        ni = nj;
    }

    // Remaining new axes have size 1.
    for k in ni..new_dims {
        new_stride.set(k, 1);
    }

    Some(new_stride)
}

#[cfg(test)]
mod tests {
    use ptensor_testing::TestCases;

    use super::{is_contiguous, may_have_internal_overlap, reshaped_stride, span_len};
    use crate::extents::{Shape, Stride};

    fn layout(shape: &[i64], stride: &[i64]) -> (Shape, Stride) {
        (Shape::new(shape).unwrap(), Stride::new(stride).unwrap())
    }

    #[test]
    fn test_is_contiguous() {
        #[derive(Debug)]
        struct Case {
            shape: &'static [i64],
            stride: &'static [i64],
            contiguous: bool,
        }

        let cases = [
            Case { shape: &[], stride: &[], contiguous: true },
            Case { shape: &[5], stride: &[1], contiguous: true },
            Case { shape: &[5], stride: &[2], contiguous: false },
            Case { shape: &[1], stride: &[2], contiguous: true },
            Case { shape: &[5, 5], stride: &[5, 1], contiguous: true },
            Case { shape: &[5, 1], stride: &[1, 2], contiguous: true },
            Case { shape: &[5, 5], stride: &[1, 5], contiguous: false },
            Case { shape: &[5, 5], stride: &[1, 0], contiguous: false },
            Case { shape: &[2, 1, 3], stride: &[3, 1, 1], contiguous: true },
            Case { shape: &[1, 4, 5, 5], stride: &[100, 25, 5, 1], contiguous: true },
            Case { shape: &[1, 4, 5, 5], stride: &[100, 25, 1, 5], contiguous: false },
            Case { shape: &[3, 0], stride: &[7, 7], contiguous: true },
        ];

        cases.test_each(|case| {
            let (shape, stride) = layout(case.shape, case.stride);
            assert_eq!(is_contiguous(&shape, &stride), case.contiguous);
        })
    }

    #[test]
    fn test_span_len() {
        let (shape, stride) = layout(&[2, 3], &[3, 1]);
        assert_eq!(span_len(&shape, &stride), Some(6));
        let (shape, stride) = layout(&[3], &[4]);
        assert_eq!(span_len(&shape, &stride), Some(9));
        let (shape, stride) = layout(&[4, 4], &[0, 0]);
        assert_eq!(span_len(&shape, &stride), Some(1));
        let (shape, stride) = layout(&[0, 4], &[4, 1]);
        assert_eq!(span_len(&shape, &stride), Some(0));
        let (shape, stride) = layout(&[2], &[-1]);
        assert_eq!(span_len(&shape, &stride), None);
        let (shape, stride) = layout(&[3, 2], &[i64::MAX, 1]);
        assert_eq!(span_len(&shape, &stride), None);
    }

    #[test]
    fn test_may_have_internal_overlap() {
        #[derive(Debug)]
        struct Case {
            shape: &'static [i64],
            stride: &'static [i64],
            overlap: bool,
        }

        let cases = [
            Case { shape: &[2, 3], stride: &[3, 1], overlap: false },
            Case { shape: &[3, 2], stride: &[1, 3], overlap: false },
            Case { shape: &[3], stride: &[2], overlap: false },
            Case { shape: &[4, 4], stride: &[0, 1], overlap: true },
            Case { shape: &[4, 4], stride: &[2, 1], overlap: true },
            Case { shape: &[1, 4], stride: &[0, 1], overlap: false },
            Case { shape: &[0, 4], stride: &[0, 0], overlap: false },
        ];

        cases.test_each(|case| {
            let (shape, stride) = layout(case.shape, case.stride);
            assert_eq!(may_have_internal_overlap(&shape, &stride), case.overlap);
        })
    }

    #[test]
    fn test_reshaped_stride() {
        #[derive(Debug)]
        struct Case {
            shape: &'static [i64],
            stride: &'static [i64],
            new_shape: &'static [i64],
            expected: Option<&'static [i64]>,
        }

        let cases = [
            // Contiguous input.
            Case {
                shape: &[2, 3],
                stride: &[3, 1],
                new_shape: &[3, 2],
                expected: Some(&[2, 1]),
            },
            // Column 0 of a 4x5 matrix, split into 2x2.
            Case {
                shape: &[4],
                stride: &[5],
                new_shape: &[2, 2],
                expected: Some(&[10, 5]),
            },
            // Rows of a padded matrix. Merging a row with its padding is not
            // possible, but splitting the row axis is.
            Case {
                shape: &[4, 3],
                stride: &[8, 1],
                new_shape: &[2, 2, 3],
                expected: Some(&[16, 8, 1]),
            },
            Case {
                shape: &[4, 3],
                stride: &[8, 1],
                new_shape: &[12],
                expected: None,
            },
            // Transposed matrix cannot be flattened.
            Case {
                shape: &[3, 2],
                stride: &[1, 3],
                new_shape: &[6],
                expected: None,
            },
            // Unit axes are inserted and removed freely.
            Case {
                shape: &[4, 1, 3],
                stride: &[8, 99, 1],
                new_shape: &[1, 4, 3, 1],
                expected: Some(&[12, 8, 1, 1]),
            },
            Case {
                shape: &[2, 3],
                stride: &[3, 1],
                new_shape: &[7],
                expected: None,
            },
        ];

        cases.test_each(|case| {
            let (shape, stride) = layout(case.shape, case.stride);
            let new_shape = Shape::new(case.new_shape).unwrap();
            let result = reshaped_stride(&shape, &stride, &new_shape);
            match case.expected {
                Some(expected) => {
                    let result = result.expect("reshape should succeed");
                    // Strides of unit axes are unconstrained.
                    for (axis, &exp) in expected.iter().enumerate() {
                        if new_shape[axis] != 1 {
                            assert_eq!(result[axis], exp, "axis {}", axis);
                        }
                    }
                }
                None => assert!(result.is_none()),
            }
        })
    }
}
