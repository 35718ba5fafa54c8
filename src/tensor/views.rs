use crate::dtype::{ElementVisitor, ElementVisitorMut};
use crate::errors::{Error, Result};
use crate::extents::{Shape, Stride};
use crate::layout::may_have_internal_overlap;
use crate::offsets::Offsets;
use crate::views::{
    Accessor1D, Accessor1DMut, Accessor2D, Accessor2DMut, Accessor3D, Accessor3DMut,
    PlanarSpan3D, PlanarSpan3DMut, Span2D, Span2DMut, Span3D, Span3DMut, StridedIter,
    StridedIterMut, ViewElement,
};
use crate::dtype::Element;

use super::Tensor;

fn as_usizes<const N: usize>(values: &[i64]) -> [usize; N] {
    let mut result = [0; N];
    for (dst, &src) in result.iter_mut().zip(values) {
        *dst = src as usize;
    }
    result
}

impl<'a> Tensor<'a> {
    /// Check that elements can be viewed as `T` and return the shape and
    /// stride of the view, in units of `T`.
    ///
    /// For complex `T` the trailing axis of size 2 holds the real and
    /// imaginary parts and is removed from the result. If `dims` is given the
    /// view must have that many axes.
    fn view_layout<T: ViewElement>(&self, dims: Option<usize>) -> Result<(Shape, Stride)> {
        let expected = <T::Scalar as Element>::DTYPE;
        if self.dtype != expected {
            return Err(Error::invalid_argument(format!(
                "cannot view {} tensor as {}",
                self.dtype, expected
            )));
        }

        let (mut shape, mut stride) = (self.shape, self.stride);
        if T::LANES > 1 {
            let lanes = T::LANES as i64;
            // A lone component axis would leave a rank-0 view with no elements.
            if shape.dims() < 2 {
                return Err(Error::invalid_argument(format!(
                    "complex view requires at least 2 dims, got shape {}",
                    shape
                )));
            }
            if shape.back() != Some(lanes) || stride.back() != Some(1) {
                return Err(Error::invalid_argument(format!(
                    "complex view requires a trailing axis of size {} and stride 1, got shape {} and stride {}",
                    lanes, shape, stride
                )));
            }
            shape.remove(shape.dims() - 1);
            stride.remove(stride.dims() - 1);
            for axis in 0..stride.dims() {
                if shape[axis] > 1 && stride[axis] % lanes != 0 {
                    return Err(Error::invalid_argument(format!(
                        "stride {} is not a multiple of the complex element size",
                        stride
                    )));
                }
                stride.set(axis, stride[axis] / lanes);
            }
        }

        if let Some(dims) = dims {
            if shape.dims() != dims {
                return Err(Error::invalid_argument(format!(
                    "expected a {}D tensor but shape is {}",
                    dims, shape
                )));
            }
        }
        Ok((shape, stride))
    }

    /// Like [`view_layout`](Tensor::view_layout), but also requires the
    /// tensor to be contiguous.
    fn span_layout<T: ViewElement>(&self, dims: Option<usize>) -> Result<[usize; 3]> {
        let (shape, _) = self.view_layout::<T>(dims)?;
        if !self.is_contiguous {
            return Err(Error::invalid_argument(
                "spans require a contiguous tensor, use an accessor or to_contiguous",
            ));
        }
        Ok(as_usizes(shape.as_slice()))
    }

    /// Return all elements as a slice, in index order.
    ///
    /// Works for tensors of any rank, but requires the tensor to be
    /// contiguous. Fails with `InvalidArgument` if `T` does not match the
    /// element type.
    pub fn as_span1d<T: ViewElement>(&self) -> Result<&[T]> {
        self.span_layout::<T>(None)?;
        self.raw_elements::<T>()
    }

    /// Mutable variant of [`as_span1d`](Tensor::as_span1d).
    pub fn as_span1d_mut<T: ViewElement>(&mut self) -> Result<&mut [T]> {
        self.span_layout::<T>(None)?;
        self.raw_elements_mut::<T>()
    }

    /// View a contiguous 2D tensor as rows and columns.
    pub fn as_span2d<T: ViewElement>(&self) -> Result<Span2D<'_, T>> {
        let [h, w, _] = self.span_layout::<T>(Some(2))?;
        Span2D::new(self.raw_elements::<T>()?, h, w).ok_or_else(layout_mismatch)
    }

    pub fn as_span2d_mut<T: ViewElement>(&mut self) -> Result<Span2DMut<'_, T>> {
        let [h, w, _] = self.span_layout::<T>(Some(2))?;
        Span2DMut::new(self.raw_elements_mut::<T>()?, h, w).ok_or_else(layout_mismatch)
    }

    /// View a contiguous 3D tensor with axes (height, width, channels).
    pub fn as_span3d<T: ViewElement>(&self) -> Result<Span3D<'_, T>> {
        let [h, w, c] = self.span_layout::<T>(Some(3))?;
        Span3D::new(self.raw_elements::<T>()?, h, w, c).ok_or_else(layout_mismatch)
    }

    pub fn as_span3d_mut<T: ViewElement>(&mut self) -> Result<Span3DMut<'_, T>> {
        let [h, w, c] = self.span_layout::<T>(Some(3))?;
        Span3DMut::new(self.raw_elements_mut::<T>()?, h, w, c).ok_or_else(layout_mismatch)
    }

    /// View a contiguous 3D tensor with axes (channels, height, width).
    pub fn as_planar_span3d<T: ViewElement>(&self) -> Result<PlanarSpan3D<'_, T>> {
        let [c, h, w] = self.span_layout::<T>(Some(3))?;
        PlanarSpan3D::new(self.raw_elements::<T>()?, c, h, w).ok_or_else(layout_mismatch)
    }

    pub fn as_planar_span3d_mut<T: ViewElement>(&mut self) -> Result<PlanarSpan3DMut<'_, T>> {
        let [c, h, w] = self.span_layout::<T>(Some(3))?;
        PlanarSpan3DMut::new(self.raw_elements_mut::<T>()?, c, h, w).ok_or_else(layout_mismatch)
    }

    /// View a 1D tensor with any stride.
    pub fn as_accessor1d<T: ViewElement>(&self) -> Result<Accessor1D<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(Some(1))?;
        Accessor1D::new(
            self.raw_elements::<T>()?,
            shape[0] as usize,
            stride[0] as usize,
        )
        .ok_or_else(layout_mismatch)
    }

    pub fn as_accessor1d_mut<T: ViewElement>(&mut self) -> Result<Accessor1DMut<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(Some(1))?;
        Accessor1DMut::new(
            self.raw_elements_mut::<T>()?,
            shape[0] as usize,
            stride[0] as usize,
        )
        .ok_or_else(layout_mismatch)
    }

    /// View a 2D tensor with any strides.
    pub fn as_accessor2d<T: ViewElement>(&self) -> Result<Accessor2D<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(Some(2))?;
        Accessor2D::new(
            self.raw_elements::<T>()?,
            as_usizes(shape.as_slice()),
            as_usizes(stride.as_slice()),
        )
        .ok_or_else(layout_mismatch)
    }

    pub fn as_accessor2d_mut<T: ViewElement>(&mut self) -> Result<Accessor2DMut<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(Some(2))?;
        Accessor2DMut::new(
            self.raw_elements_mut::<T>()?,
            as_usizes(shape.as_slice()),
            as_usizes(stride.as_slice()),
        )
        .ok_or_else(layout_mismatch)
    }

    /// View a 3D tensor with any strides.
    pub fn as_accessor3d<T: ViewElement>(&self) -> Result<Accessor3D<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(Some(3))?;
        Accessor3D::new(
            self.raw_elements::<T>()?,
            as_usizes(shape.as_slice()),
            as_usizes(stride.as_slice()),
        )
        .ok_or_else(layout_mismatch)
    }

    pub fn as_accessor3d_mut<T: ViewElement>(&mut self) -> Result<Accessor3DMut<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(Some(3))?;
        Accessor3DMut::new(
            self.raw_elements_mut::<T>()?,
            as_usizes(shape.as_slice()),
            as_usizes(stride.as_slice()),
        )
        .ok_or_else(layout_mismatch)
    }

    /// Iterate over elements in index order, following the strides.
    pub fn iter<T: ViewElement>(&self) -> Result<StridedIter<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(None)?;
        let data = self.raw_elements::<T>()?;
        Ok(StridedIter::new(data, Offsets::new(&shape, &stride)))
    }

    /// Iterate mutably over elements in index order, following the strides.
    ///
    /// Fails with `InvalidOperation` if several indices may refer to the same
    /// element, as happens for broadcast-style zero strides.
    pub fn iter_mut<T: ViewElement>(&mut self) -> Result<StridedIterMut<'_, T>> {
        let (shape, stride) = self.view_layout::<T>(None)?;
        if may_have_internal_overlap(&shape, &stride) {
            return Err(Error::invalid_operation(
                "cannot mutably iterate over a tensor whose elements overlap",
            ));
        }
        let data = self.raw_elements_mut::<T>()?;
        // Safety: The layout has no internal overlap, so offsets are unique.
        Ok(unsafe { StridedIterMut::new(data, Offsets::new(&shape, &stride)) })
    }

    /// Pass the elements of a contiguous tensor, as a slice of the element
    /// type, to `visitor`.
    pub fn visit<V: ElementVisitor>(&self, visitor: V) -> Result<V::Output> {
        self.check_visitable()?;
        self.dtype.visit(self.as_bytes()?, visitor)
    }

    /// Mutable variant of [`visit`](Tensor::visit).
    pub fn visit_mut<V: ElementVisitorMut>(&mut self, visitor: V) -> Result<V::Output> {
        self.check_visitable()?;
        let dtype = self.dtype;
        dtype.visit_mut(self.as_bytes_mut()?, visitor)
    }

    fn check_visitable(&self) -> Result<()> {
        if !self.is_contiguous {
            return Err(Error::invalid_argument(
                "visiting requires a contiguous tensor",
            ));
        }
        Ok(())
    }
}

fn layout_mismatch() -> Error {
    Error::invalid_argument("tensor layout does not fit its storage")
}
