//! Typed views of tensor memory.
//!
//! Spans ([`Span2D`], [`Span3D`], [`PlanarSpan3D`]) view densely packed data
//! and index it with simple row-major arithmetic. Accessors
//! ([`Accessor1D`] etc.) carry explicit per-axis strides and can view data
//! which is not contiguous. All indexing is bounds checked and panics if an
//! index is out of range.
//!
//! Views are obtained from a tensor with methods such as
//! [`Tensor::as_span2d`](crate::Tensor::as_span2d), which check the element
//! type and rank of the tensor first.

use num_complex::Complex;

use crate::dtype::Element;

mod accessor;
mod iter;
mod span;

pub use accessor::{
    Accessor1D, Accessor1DMut, Accessor2D, Accessor2DMut, Accessor3D, Accessor3DMut,
};
pub use iter::{StridedIter, StridedIterMut};
pub use span::{PlanarSpan3D, PlanarSpan3DMut, Span2D, Span2DMut, Span3D, Span3DMut};

/// Type which a tensor's elements can be viewed as.
///
/// This is either a scalar element type, or a complex number whose real and
/// imaginary parts are stored as a trailing axis of size 2.
pub trait ViewElement: bytemuck::Pod + Send + Sync + 'static {
    /// Element type of the tensor being viewed.
    type Scalar: Element;

    /// Number of tensor elements which form one view element.
    const LANES: usize;
}

macro_rules! impl_scalar_view_element {
    ($($ty:ty),*) => {
        $(
            impl ViewElement for $ty {
                type Scalar = $ty;
                const LANES: usize = 1;
            }
        )*
    };
}

impl_scalar_view_element!(f32, f64, half::f16, u8, u16, u32, i8, i16, i32, i64);

impl ViewElement for Complex<f32> {
    type Scalar = f32;
    const LANES: usize = 2;
}

impl ViewElement for Complex<f64> {
    type Scalar = f64;
    const LANES: usize = 2;
}

/// Return true if every element addressed by `shape` and `stride` is inside
/// a buffer of `len` elements.
fn layout_fits(len: usize, shape: &[usize], stride: &[usize]) -> bool {
    if shape.iter().any(|&size| size == 0) {
        return true;
    }
    let max_offset = shape
        .iter()
        .zip(stride)
        .try_fold(0usize, |acc, (&size, &stride)| {
            (size - 1)
                .checked_mul(stride)
                .and_then(|offset| acc.checked_add(offset))
        });
    matches!(max_offset, Some(max_offset) if max_offset < len)
}
