use log::debug;
use ptensor_simd::Isa;

use crate::dtype::{dispatch_dtype, Element};
use crate::errors::{Error, Result};
use crate::extents::Shape;

use super::Tensor;

/// Side length of the square blocks which the matrix is transposed in.
const BLOCK: usize = 8;

impl Tensor<'_> {
    /// Write the transpose of this 2D tensor into `out`.
    ///
    /// `out` is re-created with shape `[cols, rows]`, reusing its storage when
    /// possible. This tensor must be a contiguous CPU tensor.
    pub fn transpose(&self, out: &mut Tensor) -> Result<()> {
        self.transpose_with_isa(out, Isa::detect())
    }

    /// Variant of [`transpose`](Tensor::transpose) which uses kernels for a
    /// given instruction set.
    pub fn transpose_with_isa(&self, out: &mut Tensor, isa: Isa) -> Result<()> {
        if self.dims() != 2 {
            return Err(Error::invalid_argument(format!(
                "transpose requires a 2D tensor, got shape {}",
                self.shape
            )));
        }
        self.check_cpu_data()?;
        if !self.is_contiguous {
            return Err(Error::invalid_argument(
                "transpose requires a contiguous tensor",
            ));
        }

        let (rows, cols) = (self.shape[0] as usize, self.shape[1] as usize);
        out.create(Shape::new(&[cols as i64, rows as i64])?, self.dtype)?;

        dispatch_dtype!(self.dtype, T => {
            let src = self.raw_elements::<T>()?;
            let dst = out.raw_elements_mut::<T>()?;
            transpose_matrix(isa, src, dst, rows, cols);
        });
        Ok(())
    }
}

/// Transpose a `rows x cols` row-major matrix into a `cols x rows` one.
fn transpose_matrix<T: Element>(isa: Isa, src: &[T], dst: &mut [T], rows: usize, cols: usize) {
    if rows < BLOCK || cols < BLOCK {
        debug!("transposing {}x{} matrix without blocking", rows, cols);
        transpose_range(src, dst, rows, cols, 0..rows, 0..cols);
        return;
    }

    let vectorized = std::mem::size_of::<T>() == 4 && isa.is_vector();
    debug!(
        "transposing {}x{} matrix in {}x{} blocks ({} kernel)",
        rows,
        cols,
        BLOCK,
        BLOCK,
        if vectorized { isa.name() } else { "scalar" }
    );

    let full_rows = rows - rows % BLOCK;
    let full_cols = cols - cols % BLOCK;

    for r0 in (0..full_rows).step_by(BLOCK) {
        for c0 in (0..full_cols).step_by(BLOCK) {
            if !(vectorized && transpose_block_u32(isa, src, dst, rows, cols, r0, c0)) {
                transpose_range(src, dst, rows, cols, r0..r0 + BLOCK, c0..c0 + BLOCK);
            }
        }
        transpose_range(src, dst, rows, cols, r0..r0 + BLOCK, full_cols..cols);
    }
    transpose_range(src, dst, rows, cols, full_rows..rows, 0..cols);
}

/// Transpose the 8x8 block at `(r0, c0)` using 32-bit lanes. Returns false if
/// the element type could not be reinterpreted as `u32`.
fn transpose_block_u32<T: Element>(
    isa: Isa,
    src: &[T],
    dst: &mut [T],
    rows: usize,
    cols: usize,
    r0: usize,
    c0: usize,
) -> bool {
    let (Ok(src), Ok(dst)) = (
        bytemuck::try_cast_slice::<T, u32>(src),
        bytemuck::try_cast_slice_mut::<T, u32>(dst),
    ) else {
        return false;
    };
    ptensor_simd::transpose_8x8_u32(
        isa,
        &src[r0 * cols + c0..],
        cols,
        &mut dst[c0 * rows + r0..],
        rows,
    );
    true
}

fn transpose_range<T: Copy>(
    src: &[T],
    dst: &mut [T],
    rows: usize,
    cols: usize,
    row_range: std::ops::Range<usize>,
    col_range: std::ops::Range<usize>,
) {
    for r in row_range {
        for c in col_range.clone() {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
}
