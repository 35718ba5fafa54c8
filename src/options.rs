use crate::axis::Axes;
use crate::device::Device;
use crate::dtype::Dtype;
use crate::extents::Stride;

/// Options for creating a tensor.
///
/// Unset fields use defaults: `Float32` elements, row-major strides derived
/// from the shape, `Any` axis labels and the CPU device.
///
/// ```
/// use ptensor::{Dtype, TensorOptions};
///
/// let opts = TensorOptions::new().dtype(Dtype::Uint8);
/// assert_eq!(opts.get_dtype(), Dtype::Uint8);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TensorOptions {
    dtype: Dtype,
    stride: Option<Stride>,
    axes: Option<Axes>,
    device: Device,
}

impl TensorOptions {
    pub fn new() -> TensorOptions {
        TensorOptions::default()
    }

    pub fn dtype(mut self, dtype: Dtype) -> Self {
        self.dtype = dtype;
        self
    }

    /// Set explicit element strides. An empty stride means "derive from the
    /// shape".
    pub fn stride(mut self, stride: Stride) -> Self {
        self.stride = (stride.dims() > 0).then_some(stride);
        self
    }

    pub fn axes(mut self, axes: Axes) -> Self {
        self.axes = Some(axes);
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn get_dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn get_stride(&self) -> Option<&Stride> {
        self.stride.as_ref()
    }

    pub fn get_axes(&self) -> Option<&Axes> {
        self.axes.as_ref()
    }

    pub fn get_device(&self) -> Device {
        self.device
    }
}

impl From<Dtype> for TensorOptions {
    fn from(dtype: Dtype) -> TensorOptions {
        TensorOptions::new().dtype(dtype)
    }
}

impl From<Device> for TensorOptions {
    fn from(device: Device) -> TensorOptions {
        TensorOptions::new().device(device)
    }
}
