//! ptensor provides multi-dimensional arrays ("tensors") over raw memory.
//!
//! A [`Tensor`] pairs a buffer of bytes ([`Blob`]) with a runtime element
//! type ([`Dtype`]), a [`Shape`] and per-axis [`Stride`]s. Tensors can own
//! their memory, borrow it from a slice or another tensor, or wrap memory
//! allocated by other code, such as an image decoder or a language binding.
//!
//! # Creating tensors
//!
//! ```
//! use ptensor::{Dtype, Shape, Tensor};
//!
//! let mut tensor = Tensor::from_range(Shape::new(&[2, 3])?, 0, Dtype::Float32)?;
//! tensor.reshape(Shape::new(&[3, 2])?)?;
//! assert_eq!(tensor.as_span2d::<f32>()?.row(1), &[2., 3.]);
//! # Ok::<(), ptensor::Error>(())
//! ```
//!
//! # Accessing elements
//!
//! Elements are accessed through typed views, which check that the requested
//! Rust type matches the tensor's [`Dtype`] before touching memory:
//!
//! - Spans ([`Tensor::as_span1d`], [`Tensor::as_span2d`] etc.) view
//!   contiguous tensors.
//! - Accessors ([`Tensor::as_accessor2d`] etc.) and iterators
//!   ([`Tensor::iter`]) follow arbitrary strides.
//! - [`Tensor::visit`] dispatches to code which is generic over the element
//!   type.
//!
//! Complex tensors are stored as real tensors with a trailing axis of size 2,
//! and can be viewed as [`num_complex::Complex`] values.
//!
//! # Kernels
//!
//! [`Tensor::transpose`] and the [`ops`] module provide data movement and
//! arithmetic kernels. Transpose and resize have vectorized AVX2
//! implementations which are selected at runtime. Set the
//! `PTENSOR_DISABLE_SIMD` environment variable to `1` to use the scalar
//! implementations instead.
//!
//! # Logging
//!
//! Diagnostic messages are emitted with the [`log`](https://docs.rs/log)
//! crate. Install a logger such as `env_logger` to see them.

mod axis;
mod blob;
mod device;
mod dtype;
mod errors;
mod extents;
mod layout;
mod offsets;
mod options;
mod print;
mod rng;
mod tensor;

pub mod ops;
pub mod views;

pub use axis::{Axes, Axis, AxisUsage};
pub use blob::{Blob, Deallocator, BLOB_ALIGN};
pub use device::Device;
pub use dtype::{
    Dtype, Element, ElementVisitor, ElementVisitorMut, FloatElement, IntElement, TypeMatcher,
};
pub use errors::{Error, ErrorKind, Result};
pub use extents::{Shape, Stride, MAX_SHAPE};
pub use layout::{is_contiguous, may_have_internal_overlap};
pub use offsets::Offsets;
pub use options::TensorOptions;
pub use print::TensorStringOptions;
pub use rng::{RandomSource, XorShiftRng};
pub use tensor::Tensor;

pub use ptensor_simd::Isa;
