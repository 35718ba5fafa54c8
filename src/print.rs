//! Human-readable formatting of tensors.

use std::fmt;
use std::fmt::Write;

use crate::dtype::{dispatch_dtype, Element};
use crate::extents::{Shape, Stride};
use crate::tensor::Tensor;

/// Options for [`Tensor::to_string_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorStringOptions {
    /// Digits after the decimal point for floating point elements.
    pub float_precision: usize,

    /// Maximum number of entries to print along each axis. If an axis is
    /// longer, its first and last `max_elements / 2` entries are printed with
    /// "..." in between.
    pub max_elements: Option<usize>,
}

impl Default for TensorStringOptions {
    fn default() -> Self {
        TensorStringOptions {
            float_precision: 4,
            max_elements: None,
        }
    }
}

struct Printer<'a, T> {
    data: &'a [T],
    options: &'a TensorStringOptions,
    is_float: bool,
}

impl<T: Element> Printer<'_, T> {
    fn write(&self, out: &mut String, offset: usize, shape: &[i64], stride: &[i64]) -> fmt::Result {
        let Some((&size, inner_shape)) = shape.split_first() else {
            return out.write_str("[]");
        };
        let size = size as usize;
        let step = stride[0] as usize;
        let separator = if inner_shape.is_empty() { ", " } else { ",\n" };
        let half = self.options.max_elements.map_or(size, |max| max / 2);
        let truncated = self.options.max_elements.is_some_and(|max| size > max);

        out.write_char('[')?;
        let mut first = true;
        let mut i = 0;
        while i < size {
            if !first {
                out.write_str(separator)?;
            }
            first = false;

            if truncated && i == half {
                out.write_str("...")?;
                i = size - half;
                continue;
            }

            let offset = offset + i * step;
            if inner_shape.is_empty() {
                self.write_element(out, self.data[offset])?;
            } else {
                self.write(out, offset, inner_shape, &stride[1..])?;
            }
            i += 1;
        }
        out.write_char(']')
    }

    fn write_element(&self, out: &mut String, value: T) -> fmt::Result {
        if self.is_float {
            write!(out, "{:.*}", self.options.float_precision, value.to_f64())
        } else {
            write!(out, "{}", value)
        }
    }
}

fn write_values<T: Element>(
    out: &mut String,
    data: &[T],
    shape: &Shape,
    stride: &Stride,
    options: &TensorStringOptions,
) -> fmt::Result {
    let printer = Printer {
        data,
        options,
        is_float: T::DTYPE.is_floating_point(),
    };
    if shape.is_empty() && shape.dims() > 0 {
        // Print the nesting of empty axes without reading any data.
        let empty_axis = shape.iter().position(|size| size == 0).unwrap_or(0);
        for _ in 0..=empty_axis {
            out.write_char('[')?;
        }
        for _ in 0..=empty_axis {
            out.write_char(']')?;
        }
        return Ok(());
    }
    printer.write(out, 0, shape.as_slice(), stride.as_slice())
}

impl Tensor<'_> {
    /// Format this tensor as `Tensor(shape=[..], dtype=.., values=[..])`.
    ///
    /// Rows of matrices and higher-rank tensors are separated by newlines.
    /// Elements of tensors that are not on the CPU are not printed.
    pub fn to_string_with(&self, options: &TensorStringOptions) -> String {
        let values = if self.device().is_cpu() {
            dispatch_dtype!(self.dtype(), T => {
                self.raw_elements::<T>().ok().and_then(|data| {
                    let mut values = String::new();
                    write_values(&mut values, data, self.shape(), self.stride(), options)
                        .ok()
                        .map(|_| values)
                })
            })
        } else {
            None
        };
        format!(
            "Tensor(shape={}, dtype={}, values={})",
            self.shape(),
            self.dtype(),
            values.unwrap_or_else(|| format!("<{}>", self.device()))
        )
    }
}

impl fmt::Display for Tensor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&TensorStringOptions::default()))
    }
}
