//! Kernels which read tensors and write their results into output tensors.
//!
//! Outputs are re-created with [`Tensor::create`](crate::Tensor::create), so
//! an output tensor can be reused across calls without reallocating.

mod elemwise;
mod resize;

pub use elemwise::{add, multiply, multiply_scalar, subtract};
pub use resize::{resize, resize_with_isa};
