use crate::axis::{Axes, Axis};
use crate::errors::{Error, Result};
use crate::extents::{Shape, Stride, MAX_SHAPE};
use crate::layout::reshaped_stride;

use super::Tensor;

impl<'a> Tensor<'a> {
    /// Change the shape of this tensor without moving any elements.
    ///
    /// The new shape must have the same number of elements. For a
    /// non-contiguous tensor, each group of new axes must split or merge a run
    /// of old axes which is contiguous within itself, otherwise this fails
    /// with `InvalidArgument`. Axis labels are reset to `Any`.
    ///
    /// A contiguous tensor gets the row-major stride of the new shape. A
    /// non-contiguous tensor keeps its layout: the new axes of each group are
    /// packed row-major starting from the stride of the group's innermost old
    /// axis, so the result is a view of the same elements.
    pub fn reshape(&mut self, new_shape: Shape) -> Result<()> {
        if new_shape.count() != self.size() {
            return Err(Error::invalid_argument(format!(
                "cannot reshape tensor of shape {} to {}",
                self.shape, new_shape
            )));
        }
        let stride = reshaped_stride(&self.shape, &self.stride, &new_shape).ok_or_else(|| {
            Error::invalid_argument(format!(
                "cannot reshape tensor of shape {} and stride {} to {} without copying",
                self.shape, self.stride, new_shape
            ))
        })?;
        self.shape = new_shape;
        self.stride = stride;
        self.axes = Axes::any(new_shape.dims());
        self.update_contiguity();
        Ok(())
    }

    /// Remove axes of size 1, together with their strides and labels.
    ///
    /// If every axis has size 1, a single axis is kept so that the tensor
    /// still has an element.
    pub fn squeeze(&mut self) {
        let dims = self.dims();
        let mut keep = [false; MAX_SHAPE];
        for (axis, size) in self.shape.iter().enumerate() {
            keep[axis] = size != 1;
        }
        if keep[..dims].iter().all(|&k| k) {
            return;
        }
        if keep[..dims].iter().all(|&k| !k) {
            keep[dims - 1] = true;
        }

        for axis in (0..dims).rev().filter(|&axis| !keep[axis]) {
            self.shape.remove(axis);
            self.stride.remove(axis);
        }
        self.axes.retain_indices(|axis| keep[axis]);
        self.update_contiguity();
    }

    /// Insert an axis of size 1 at position `dim`, which may be at most
    /// [`dims`](Tensor::dims).
    ///
    /// Fails with `InvalidArgument` if `dim` is out of range and `OutOfRange`
    /// if the tensor already has the maximum number of axes.
    pub fn unsqueeze(&mut self, dim: usize) -> Result<()> {
        let dims = self.dims();
        if dim > dims {
            return Err(Error::invalid_argument(format!(
                "cannot insert axis {} into tensor with {} dims",
                dim, dims
            )));
        }
        let stride = if dim == 0 {
            self.size().max(1) as i64
        } else if dim < dims {
            self.stride[dim]
        } else {
            1
        };
        self.shape.insert(dim, 1)?;
        self.stride.insert(dim, stride)?;
        self.axes.insert(dim, Axis::default());
        self.update_contiguity();
        Ok(())
    }

    fn check_selection(&self, dim: usize, index: i64) -> Result<usize> {
        let size = self.shape.get(dim).map_err(|_| {
            Error::invalid_argument(format!(
                "cannot select axis {} of tensor with {} dims",
                dim,
                self.dims()
            ))
        })?;
        if index < 0 || index >= size {
            return Err(Error::invalid_argument(format!(
                "index {} out of range for axis {} of size {}",
                index, dim, size
            )));
        }
        Ok(index as usize * self.stride[dim] as usize * self.dtype.size_bytes())
    }

    /// Return the shape, stride and labels after removing `dim`.
    fn selected_layout(&self, dim: usize) -> (Shape, Stride, Axes) {
        let (mut shape, mut stride, mut axes) = (self.shape, self.stride, self.axes.clone());
        shape.remove(dim);
        stride.remove(dim);
        axes.remove(dim);
        (shape, stride, axes)
    }

    /// Return a read-only view of the slice of this tensor at `index` along
    /// axis `dim`.
    ///
    /// The result has one axis fewer and shares this tensor's memory. It is
    /// contiguous if this tensor is contiguous and `dim` is 0.
    pub fn select_dimension(&self, dim: usize, index: i64) -> Result<Tensor<'_>> {
        let offset = self.check_selection(dim, index)?;
        let blob = self.blob.view(offset)?;
        let (shape, stride, axes) = self.selected_layout(dim);
        Ok(Tensor::from_parts(blob, self.dtype, shape, stride, axes))
    }

    /// Writable variant of [`select_dimension`](Tensor::select_dimension).
    ///
    /// Fails with `InvalidOperation` if this tensor is read-only.
    pub fn select_dimension_mut(&mut self, dim: usize, index: i64) -> Result<Tensor<'_>> {
        let offset = self.check_selection(dim, index)?;
        let (shape, stride, axes) = self.selected_layout(dim);
        let dtype = self.dtype;
        let blob = self.blob.view_mut(offset)?;
        Ok(Tensor::from_parts(blob, dtype, shape, stride, axes))
    }

    /// Return a read-only view of this tensor.
    pub fn as_view(&self) -> Tensor<'_> {
        Tensor::from_parts(
            self.blob.as_view(),
            self.dtype,
            self.shape,
            self.stride,
            self.axes.clone(),
        )
    }

    /// Return a writable view of this tensor.
    ///
    /// Fails with `InvalidOperation` if this tensor is read-only.
    pub fn as_view_mut(&mut self) -> Result<Tensor<'_>> {
        let (dtype, shape, stride, axes) = (self.dtype, self.shape, self.stride, self.axes.clone());
        let blob = self.blob.view_mut(0)?;
        Ok(Tensor::from_parts(blob, dtype, shape, stride, axes))
    }
}
