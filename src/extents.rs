//! Fixed-capacity per-axis sizes ([`Shape`]) and memory strides ([`Stride`]).

use std::fmt;
use std::ops::Index;

use crate::errors::{Error, Result};

/// Maximum number of axes of a shape or stride.
pub const MAX_SHAPE: usize = 8;

fn too_many_dims(dims: usize) -> Error {
    Error::out_of_range(format!(
        "{} dimensions exceeds the maximum of {}",
        dims, MAX_SHAPE
    ))
}

macro_rules! impl_extents {
    ($name:ident) => {
        impl $name {
            /// Create from a list of per-axis values without further
            /// validation than the capacity check.
            fn from_values(values: &[i64]) -> Result<$name> {
                if values.len() > MAX_SHAPE {
                    return Err(too_many_dims(values.len()));
                }
                let mut array = [0; MAX_SHAPE];
                array[..values.len()].copy_from_slice(values);
                Ok($name {
                    values: array,
                    dims: values.len(),
                })
            }

            /// Return the number of axes.
            pub fn dims(&self) -> usize {
                self.dims
            }

            /// Return the value for `axis`, or an [`OutOfRange`] error if
            /// `axis >= self.dims()`.
            ///
            /// [`OutOfRange`]: crate::ErrorKind::OutOfRange
            pub fn get(&self, axis: usize) -> Result<i64> {
                self.as_slice().get(axis).copied().ok_or_else(|| {
                    Error::out_of_range(format!("axis {} out of range for {} dims", axis, self.dims))
                })
            }

            pub fn as_slice(&self) -> &[i64] {
                &self.values[..self.dims]
            }

            pub fn iter(&self) -> impl DoubleEndedIterator<Item = i64> + ExactSizeIterator + '_ {
                self.as_slice().iter().copied()
            }

            pub fn front(&self) -> Option<i64> {
                self.as_slice().first().copied()
            }

            pub fn back(&self) -> Option<i64> {
                self.as_slice().last().copied()
            }

            /// Return the values for axes `start..end`.
            pub fn subextents(&self, start: usize, end: usize) -> Result<$name> {
                if start > end || end > self.dims {
                    return Err(Error::out_of_range(format!(
                        "axis range {}..{} invalid for {} dims",
                        start, end, self.dims
                    )));
                }
                $name::from_values(&self.values[start..end])
            }

            /// Return the values reordered so that axis `i` of the result is
            /// axis `perm[i]` of `self`.
            pub fn permuted(&self, perm: &[usize]) -> Result<$name> {
                if perm.len() != self.dims {
                    return Err(Error::out_of_range(format!(
                        "permutation of length {} does not match {} dims",
                        perm.len(),
                        self.dims
                    )));
                }
                let mut seen = [false; MAX_SHAPE];
                let mut result = *self;
                for (i, &axis) in perm.iter().enumerate() {
                    if axis >= self.dims || seen[axis] {
                        return Err(Error::invalid_argument("permutation is not valid"));
                    }
                    seen[axis] = true;
                    result.values[i] = self.values[axis];
                }
                Ok(result)
            }

            pub(crate) fn set(&mut self, axis: usize, value: i64) {
                self.values[..self.dims][axis] = value;
            }

            /// Insert `value` at `axis`, shifting later axes back by one.
            pub(crate) fn insert(&mut self, axis: usize, value: i64) -> Result<()> {
                if self.dims == MAX_SHAPE {
                    return Err(too_many_dims(self.dims + 1));
                }
                self.values.copy_within(axis..self.dims, axis + 1);
                self.values[axis] = value;
                self.dims += 1;
                Ok(())
            }

            /// Remove `axis`, shifting later axes forward by one.
            pub(crate) fn remove(&mut self, axis: usize) {
                self.values.copy_within(axis + 1..self.dims, axis);
                self.dims -= 1;
                self.values[self.dims] = 0;
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name {
                    values: [0; MAX_SHAPE],
                    dims: 0,
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &$name) -> bool {
                self.as_slice() == other.as_slice()
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.as_slice().hash(state)
            }
        }

        impl Index<usize> for $name {
            type Output = i64;

            fn index(&self, axis: usize) -> &i64 {
                &self.as_slice()[axis]
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self.as_slice(), f)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self.as_slice(), f)
            }
        }

        impl TryFrom<&[i64]> for $name {
            type Error = Error;

            fn try_from(values: &[i64]) -> Result<$name> {
                $name::new(values)
            }
        }

        impl<const N: usize> TryFrom<[i64; N]> for $name {
            type Error = Error;

            fn try_from(values: [i64; N]) -> Result<$name> {
                $name::new(&values)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_seq(self.as_slice())
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<$name, D::Error> {
                let values = <Vec<i64> as serde::Deserialize>::deserialize(deserializer)?;
                $name::new(&values).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Sizes of each axis of a tensor.
///
/// Holds up to [`MAX_SHAPE`] non-negative extents inline.
#[derive(Copy, Clone)]
pub struct Shape {
    values: [i64; MAX_SHAPE],
    dims: usize,
}

impl_extents!(Shape);

impl Shape {
    /// Create a shape from per-axis sizes.
    ///
    /// Fails with `OutOfRange` if there are more than [`MAX_SHAPE`] axes and
    /// `InvalidArgument` if an extent is negative or the product of the
    /// non-zero extents overflows `i64` or `usize`.
    ///
    /// Every contiguous stride derived from an accepted shape fits in `i64`,
    /// including for shapes with no elements.
    pub fn new(extents: &[i64]) -> Result<Shape> {
        let shape = Shape::from_values(extents)?;
        if let Some(size) = extents.iter().find(|&&size| size < 0) {
            return Err(Error::invalid_argument(format!(
                "negative extent {} in shape {:?}",
                size, extents
            )));
        }
        let product = extents
            .iter()
            .filter(|&&size| size != 0)
            .try_fold(1i64, |product, &size| product.checked_mul(size));
        match product {
            Some(product) if usize::try_from(product).is_ok() => Ok(shape),
            _ => Err(Error::invalid_argument(format!(
                "element count of shape {:?} overflows",
                extents
            ))),
        }
    }

    /// Create a shape of `dims` axes which are all zero.
    pub fn zeros(dims: usize) -> Result<Shape> {
        if dims > MAX_SHAPE {
            return Err(too_many_dims(dims));
        }
        Shape::from_values(&[0; MAX_SHAPE][..dims])
    }

    /// Return the number of elements, which is zero for a shape with no axes.
    pub fn count(&self) -> usize {
        if self.dims == 0 {
            return 0;
        }
        self.iter().map(|size| size as usize).product()
    }

    /// Return true if a tensor with this shape has no elements.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Per-axis memory strides of a tensor, in elements.
#[derive(Copy, Clone)]
pub struct Stride {
    values: [i64; MAX_SHAPE],
    dims: usize,
}

impl_extents!(Stride);

impl Stride {
    /// Create a stride from per-axis values.
    pub fn new(strides: &[i64]) -> Result<Stride> {
        Stride::from_values(strides)
    }

    /// Return the row-major stride for a densely packed tensor of the given
    /// shape.
    ///
    /// The last axis has stride 1 and each earlier axis has the stride of the
    /// following axis multiplied by its size.
    pub fn from_contiguous_shape(shape: &Shape) -> Stride {
        let mut stride = Stride {
            values: [0; MAX_SHAPE],
            dims: shape.dims(),
        };
        let mut product = 1;
        for axis in (0..shape.dims()).rev() {
            stride.values[axis] = product;
            product *= shape[axis];
        }
        stride
    }
}
