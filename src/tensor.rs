//! The [`Tensor`] type and its creation, copy and fill operations.

use log::debug;

use crate::axis::Axes;
use crate::blob::{Blob, Deallocator};
use crate::device::Device;
use crate::dtype::{dispatch_dtype, Dtype, Element};
use crate::errors::{ensure, Error, Result};
use crate::extents::{Shape, Stride};
use crate::layout::{is_contiguous, span_len};
use crate::offsets::Offsets;
use crate::options::TensorOptions;
use crate::rng::RandomSource;

mod shape_ops;
mod transpose;
mod views;


/// Multi-dimensional array of elements of a runtime-selected [`Dtype`].
///
/// A tensor combines a [`Blob`] of memory with a shape, per-axis strides,
/// an element type and optional axis labels. Element `[i0, i1, ...]` is
/// stored at element offset `i0 * stride[0] + i1 * stride[1] + ...` from the
/// start of the blob.
///
/// Tensors either own their memory (`Tensor<'static>`, as returned by the
/// factory functions) or borrow it from another tensor or slice for the
/// lifetime `'a`. Views created with [`view`](Tensor::as_view) or
/// [`select_dimension`](Tensor::select_dimension) are read-only; their
/// `_mut` counterparts borrow the parent exclusively and can write to it.
///
/// ```
/// use ptensor::{Dtype, Shape, Tensor};
///
/// let tensor = Tensor::full(Shape::new(&[2, 3])?, 5., Dtype::Int32)?;
/// assert_eq!(tensor.as_span1d::<i32>()?, &[5, 5, 5, 5, 5, 5]);
/// # Ok::<(), ptensor::Error>(())
/// ```
#[derive(Debug)]
pub struct Tensor<'a> {
    blob: Blob<'a>,
    dtype: Dtype,
    shape: Shape,
    stride: Stride,
    axes: Axes,
    is_contiguous: bool,
}

/// Strides, labels and storage size resolved from a shape and options.
struct ResolvedLayout {
    stride: Stride,
    axes: Axes,
    bytes: usize,
}

fn resolve_layout(shape: &Shape, options: &TensorOptions) -> Result<ResolvedLayout> {
    let stride = match options.get_stride() {
        Some(stride) => {
            if stride.dims() != shape.dims() {
                return Err(Error::invalid_argument(format!(
                    "stride {} does not match shape {}",
                    stride, shape
                )));
            }
            if stride.iter().any(|s| s < 0) {
                return Err(Error::invalid_argument(format!(
                    "negative strides are not supported: {}",
                    stride
                )));
            }
            *stride
        }
        None => Stride::from_contiguous_shape(shape),
    };

    let axes = match options.get_axes() {
        Some(axes) if axes.dims() != shape.dims() => {
            return Err(Error::invalid_argument(format!(
                "{} axis labels given for shape {}",
                axes.dims(),
                shape
            )));
        }
        Some(axes) => axes.clone(),
        None => Axes::any(shape.dims()),
    };

    let bytes = span_len(shape, &stride)
        .and_then(|len| len.checked_mul(options.get_dtype().size_bytes()))
        .ok_or_else(|| Error::invalid_argument(format!("shape {} is too large", shape)))?;

    Ok(ResolvedLayout {
        stride,
        axes,
        bytes,
    })
}

fn check_cpu_device(device: Device) -> Result<()> {
    if !device.is_cpu() {
        return Err(Error::invalid_argument(format!(
            "cannot create tensor on device {}, allocate using your device API",
            device
        )));
    }
    Ok(())
}

impl Tensor<'static> {
    /// Allocate a tensor whose elements are zero.
    fn allocate(shape: Shape, options: TensorOptions) -> Result<Tensor<'static>> {
        check_cpu_device(options.get_device())?;
        let layout = resolve_layout(&shape, &options)?;
        let blob = Blob::allocate(layout.bytes)?;
        Ok(Tensor::from_parts(
            blob,
            options.get_dtype(),
            shape,
            layout.stride,
            layout.axes,
        ))
    }

    /// Create a tensor for the caller to fill.
    ///
    /// Storage is zero-initialized, so this is equivalent to
    /// [`zeros`](Tensor::zeros). Shapes with no elements do not allocate.
    pub fn empty(shape: Shape, options: impl Into<TensorOptions>) -> Result<Tensor<'static>> {
        Tensor::allocate(shape, options.into())
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: Shape, options: impl Into<TensorOptions>) -> Result<Tensor<'static>> {
        Tensor::allocate(shape, options.into())
    }

    /// Create a tensor with every element set to `value`, converted to the
    /// element type.
    pub fn full(
        shape: Shape,
        value: f64,
        options: impl Into<TensorOptions>,
    ) -> Result<Tensor<'static>> {
        let mut tensor = Tensor::allocate(shape, options.into())?;
        tensor.fill(value)?;
        Ok(tensor)
    }

    /// Create a tensor whose elements, in index order, are `start`,
    /// `start + 1`, ... converted to the element type.
    pub fn from_range(
        shape: Shape,
        start: i64,
        options: impl Into<TensorOptions>,
    ) -> Result<Tensor<'static>> {
        let mut tensor = Tensor::allocate(shape, options.into())?;
        dispatch_dtype!(tensor.dtype, T => {
            tensor.for_each_mut::<T>(|i, x| *x = T::from_i64(start.wrapping_add(i as i64)))
        })?;
        Ok(tensor)
    }

    /// Create a tensor of random values drawn from `rng`.
    ///
    /// Floating point elements are uniform in `[0, 1)`. Integer elements are
    /// uniform over the type's range.
    pub fn from_random<R: RandomSource>(
        shape: Shape,
        rng: &mut R,
        options: impl Into<TensorOptions>,
    ) -> Result<Tensor<'static>> {
        let mut tensor = Tensor::allocate(shape, options.into())?;
        dispatch_dtype!(tensor.dtype, T => {
            tensor.for_each_mut::<T>(|_, x| *x = rng.next_element())
        })?;
        Ok(tensor)
    }

    /// Create a contiguous tensor holding a copy of `data`.
    pub fn from_data<T: Element>(data: &[T], shape: Shape) -> Result<Tensor<'static>> {
        if data.len() != shape.count() {
            return Err(Error::invalid_argument(format!(
                "{} elements given for shape {}",
                data.len(),
                shape
            )));
        }
        let mut tensor = Tensor::allocate(shape, T::DTYPE.into())?;
        if !data.is_empty() {
            tensor
                .blob
                .as_bytes_mut()?
                .copy_from_slice(bytemuck::cast_slice(data));
        }
        Ok(tensor)
    }
}

impl<'a> Tensor<'a> {
    fn from_parts(blob: Blob<'a>, dtype: Dtype, shape: Shape, stride: Stride, axes: Axes) -> Self {
        let is_contiguous = is_contiguous(&shape, &stride);
        Tensor {
            blob,
            dtype,
            shape,
            stride,
            axes,
            is_contiguous,
        }
    }

    /// Wrap memory allocated elsewhere without copying.
    ///
    /// If `dealloc` is provided the tensor takes ownership of the memory and
    /// calls `dealloc` when dropped. Otherwise the memory must outlive `'a`.
    /// The tensor may be on any device, but only CPU data can be accessed.
    ///
    /// # Safety
    ///
    /// For CPU tensors `ptr` must be valid for reads and writes of every
    /// element addressed by `shape` and the strides in `options`, aligned for
    /// the element type, and not accessed by other means while the tensor is
    /// alive.
    pub unsafe fn from_raw_parts(
        ptr: *mut u8,
        shape: Shape,
        options: impl Into<TensorOptions>,
        dealloc: Option<Deallocator>,
    ) -> Result<Tensor<'a>> {
        let options = options.into();
        let layout = resolve_layout(&shape, &options)?;
        let blob = Blob::from_raw_parts(ptr, layout.bytes, options.get_device(), dealloc);
        Ok(Tensor::from_parts(
            blob,
            options.get_dtype(),
            shape,
            layout.stride,
            layout.axes,
        ))
    }

    /// Create a writable tensor which borrows `data`.
    pub fn from_slice<T: Element>(data: &'a mut [T], shape: Shape) -> Result<Tensor<'a>> {
        if data.len() != shape.count() {
            return Err(Error::invalid_argument(format!(
                "{} elements given for shape {}",
                data.len(),
                shape
            )));
        }
        let blob = Blob::from_bytes_mut(bytemuck::cast_slice_mut(data));
        let stride = Stride::from_contiguous_shape(&shape);
        Ok(Tensor::from_parts(
            blob,
            T::DTYPE,
            shape,
            stride,
            Axes::any(shape.dims()),
        ))
    }

    /// Create a read-only tensor which borrows `data`.
    pub fn from_slice_ref<T: Element>(data: &'a [T], shape: Shape) -> Result<Tensor<'a>> {
        if data.len() != shape.count() {
            return Err(Error::invalid_argument(format!(
                "{} elements given for shape {}",
                data.len(),
                shape
            )));
        }
        let blob = Blob::from_bytes(bytemuck::cast_slice(data));
        let stride = Stride::from_contiguous_shape(&shape);
        Ok(Tensor::from_parts(
            blob,
            T::DTYPE,
            shape,
            stride,
            Axes::any(shape.dims()),
        ))
    }

    /// Re-initialize this tensor with a new shape and options.
    ///
    /// The current storage is reused if it is writable CPU memory with at
    /// least the required capacity, in which case element values are left
    /// unchanged. Otherwise new zeroed storage is allocated.
    pub fn create(&mut self, shape: Shape, options: impl Into<TensorOptions>) -> Result<()> {
        let options = options.into();
        check_cpu_device(options.get_device())?;
        let layout = resolve_layout(&shape, &options)?;

        let reusable = self.blob.is_writable()
            && self.blob.device().is_cpu()
            && self.blob.len() >= layout.bytes;
        if !reusable {
            debug!(
                "allocating {} bytes for tensor of shape {} ({} bytes available)",
                layout.bytes,
                shape,
                self.blob.len()
            );
            self.blob = Blob::allocate(layout.bytes)?;
        }

        self.dtype = options.get_dtype();
        self.shape = shape;
        self.stride = layout.stride;
        self.axes = layout.axes;
        self.update_contiguity();
        Ok(())
    }

    /// Re-initialize this tensor with the shape, element type and axis labels
    /// of `other` and contiguous strides.
    ///
    /// See [`create`](Tensor::create).
    pub fn create_like(&mut self, other: &Tensor) -> Result<()> {
        self.create(
            other.shape,
            TensorOptions::new()
                .dtype(other.dtype)
                .axes(other.axes.clone()),
        )
    }

    pub(crate) fn update_contiguity(&mut self) {
        self.is_contiguous = is_contiguous(&self.shape, &self.stride);
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn stride(&self) -> &Stride {
        &self.stride
    }

    /// Return the size of `axis`, or an `OutOfRange` error.
    pub fn shape_at(&self, axis: usize) -> Result<i64> {
        self.shape.get(axis)
    }

    /// Return the stride of `axis`, or an `OutOfRange` error.
    pub fn stride_at(&self, axis: usize) -> Result<i64> {
        self.stride.get(axis)
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn dims(&self) -> usize {
        self.shape.dims()
    }

    /// Return the number of elements.
    pub fn size(&self) -> usize {
        self.shape.count()
    }

    /// Return the size of the elements in bytes.
    pub fn size_bytes(&self) -> usize {
        self.size() * self.dtype.size_bytes()
    }

    pub fn device(&self) -> Device {
        self.blob.device()
    }

    /// Return true if elements are densely packed in row-major order.
    pub fn is_contiguous(&self) -> bool {
        self.is_contiguous
    }

    /// Return true if the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// Return true if the tensor frees its memory when dropped.
    pub fn is_owner(&self) -> bool {
        self.blob.is_owner()
    }

    /// Return true if elements can be modified through this tensor.
    pub fn is_writable(&self) -> bool {
        self.blob.is_writable()
    }

    pub fn blob(&self) -> &Blob<'a> {
        &self.blob
    }

    /// Return the options that would create a tensor with this tensor's
    /// element type, strides, axis labels and device.
    pub fn options(&self) -> TensorOptions {
        TensorOptions::new()
            .dtype(self.dtype)
            .stride(self.stride)
            .axes(self.axes.clone())
            .device(self.device())
    }

    /// Number of bytes from the first element to one past the last
    /// addressable element.
    fn span_bytes(&self) -> usize {
        span_len(&self.shape, &self.stride).unwrap_or(0) * self.dtype.size_bytes()
    }

    /// Return the bytes spanned by the elements of this tensor.
    ///
    /// For a contiguous tensor these are the [`size_bytes`](Tensor::size_bytes)
    /// bytes of its elements in index order.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        let len = self.span_bytes();
        let bytes = self.blob.as_bytes()?;
        ensure!(len <= bytes.len(), "tensor extends beyond its storage");
        Ok(&bytes[..len])
    }

    /// Mutable variant of [`as_bytes`](Tensor::as_bytes).
    pub fn as_bytes_mut(&mut self) -> Result<&mut [u8]> {
        let len = self.span_bytes();
        let bytes = self.blob.as_bytes_mut()?;
        ensure!(len <= bytes.len(), "tensor extends beyond its storage");
        Ok(&mut bytes[..len])
    }

    /// View the spanned bytes as elements of type `T`. The caller is
    /// responsible for checking that `T` matches the element type.
    pub(crate) fn raw_elements<T: bytemuck::Pod>(&self) -> Result<&[T]> {
        let bytes = self.as_bytes()?;
        if bytes.is_empty() {
            return Ok(&[]);
        }
        bytemuck::try_cast_slice(bytes).map_err(|err| {
            Error::invalid_argument(format!("cannot view tensor data as elements: {:?}", err))
        })
    }

    pub(crate) fn raw_elements_mut<T: bytemuck::Pod>(&mut self) -> Result<&mut [T]> {
        let bytes = self.as_bytes_mut()?;
        if bytes.is_empty() {
            return Ok(&mut []);
        }
        bytemuck::try_cast_slice_mut(bytes).map_err(|err| {
            Error::invalid_argument(format!("cannot view tensor data as elements: {:?}", err))
        })
    }

    /// Call `f` with the index-order position and a mutable reference to each
    /// element.
    ///
    /// Unlike [`iter_mut`](Tensor::iter_mut) this works for layouts where
    /// several indices share an element, which is then visited more than once.
    fn for_each_mut<T: Element>(&mut self, mut f: impl FnMut(usize, &mut T)) -> Result<()> {
        let offsets = Offsets::new(&self.shape, &self.stride);
        let data = self.raw_elements_mut::<T>()?;
        for (i, offset) in offsets.enumerate() {
            f(i, &mut data[offset]);
        }
        Ok(())
    }

    /// Set every element to `value`, converted to the element type.
    ///
    /// Fails with `InvalidOperation` for read-only tensors and
    /// `NotImplemented` for non-CPU tensors.
    pub fn fill(&mut self, value: f64) -> Result<()> {
        dispatch_dtype!(self.dtype, T => {
            let value = T::from_f64(value);
            self.for_each_mut::<T>(|_, x| *x = value)
        })
    }

    /// Copy the contents of a contiguous tensor into this one.
    ///
    /// This tensor is re-created with the shape and element type of `src`,
    /// reusing its storage when possible.
    pub fn copy_from(&mut self, src: &Tensor) -> Result<()> {
        if !src.is_contiguous() {
            return Err(Error::invalid_argument(
                "copy source must be contiguous, use to_contiguous first",
            ));
        }
        let src_bytes = src.as_bytes()?;
        self.create_like(src)?;
        self.as_bytes_mut()?.copy_from_slice(src_bytes);
        Ok(())
    }

    fn check_cpu_data(&self) -> Result<()> {
        if !self.device().is_cpu() {
            return Err(Error::not_implemented(format!(
                "operation is not supported for tensors on {}",
                self.device()
            )));
        }
        Ok(())
    }

    /// Return a deep copy of this tensor which owns its memory.
    ///
    /// The copy has contiguous strides, even if this tensor does not.
    pub fn try_clone(&self) -> Result<Tensor<'static>> {
        self.check_cpu_data()?;
        if !self.is_contiguous {
            return self.to_contiguous();
        }
        let mut copy = Tensor::allocate(
            self.shape,
            TensorOptions::new()
                .dtype(self.dtype)
                .axes(self.axes.clone()),
        )?;
        copy.as_bytes_mut()?.copy_from_slice(self.as_bytes()?);
        Ok(copy)
    }

    /// Return a contiguous copy of this tensor which owns its memory.
    ///
    /// Elements are gathered in index order for non-contiguous tensors.
    pub fn to_contiguous(&self) -> Result<Tensor<'static>> {
        self.check_cpu_data()?;
        if self.is_contiguous {
            return self.try_clone();
        }
        let mut out = Tensor::allocate(
            self.shape,
            TensorOptions::new()
                .dtype(self.dtype)
                .axes(self.axes.clone()),
        )?;
        dispatch_dtype!(self.dtype, T => {
            let src = self.raw_elements::<T>()?;
            let dst = out.raw_elements_mut::<T>()?;
            for (dst, offset) in dst.iter_mut().zip(Offsets::new(&self.shape, &self.stride)) {
                *dst = src[offset];
            }
        });
        Ok(out)
    }
}

impl Default for Tensor<'_> {
    /// Return an empty `Float32` tensor with no axes.
    fn default() -> Self {
        Tensor::from_parts(
            Blob::empty(),
            Dtype::default(),
            Shape::default(),
            Stride::default(),
            Axes::default(),
        )
    }
}
