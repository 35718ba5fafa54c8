use log::debug;
use ptensor_simd::Isa;

use crate::dtype::dispatch_dtype;
use crate::errors::{Error, Result};
use crate::extents::Shape;
use crate::options::TensorOptions;
use crate::tensor::Tensor;
use crate::views::PlanarSpan3D;

/// Map each output index along an axis to the nearest source index.
fn nearest_indices(src_len: usize, dst_len: usize) -> impl Iterator<Item = usize> {
    let scale = src_len as f32 / dst_len as f32;
    (0..dst_len).map(move |i| ((i as f32 * scale) as usize).min(src_len - 1))
}

/// Resize an image using nearest-neighbor sampling.
///
/// `input` has shape `(channels, height, width)` or `(height, width)`. The
/// result is written to `output`, which is re-created with the same rank,
/// element type and axis labels and shape `(channels, new_height,
/// new_width)` or `(new_height, new_width)`. Channels are never resampled.
pub fn resize(
    input: &Tensor,
    output: &mut Tensor,
    new_width: usize,
    new_height: usize,
) -> Result<()> {
    resize_with_isa(input, output, new_width, new_height, Isa::detect())
}

/// Variant of [`resize`] which uses kernels for a given instruction set.
pub fn resize_with_isa(
    input: &Tensor,
    output: &mut Tensor,
    new_width: usize,
    new_height: usize,
    isa: Isa,
) -> Result<()> {
    let dims = input.dims();
    if dims != 2 && dims != 3 {
        return Err(Error::invalid_argument(format!(
            "resize requires a 2D or 3D tensor, got shape {}",
            input.shape()
        )));
    }
    if new_width == 0 || new_height == 0 {
        return Err(Error::invalid_argument(format!(
            "invalid output size {}x{}",
            new_width, new_height
        )));
    }
    let width = input.shape()[dims - 1] as usize;
    let height = input.shape()[dims - 2] as usize;
    if width == 0 || height == 0 {
        return Err(Error::invalid_argument("cannot resize an empty image"));
    }
    if width > i32::MAX as usize {
        return Err(Error::invalid_argument(format!(
            "image width {} is too large",
            width
        )));
    }

    let mut out_shape = *input.shape();
    out_shape.set(dims - 1, new_width as i64);
    out_shape.set(dims - 2, new_height as i64);
    let out_shape = Shape::new(out_shape.as_slice())?;
    output.create(
        out_shape,
        TensorOptions::new()
            .dtype(input.dtype())
            .axes(input.axes().clone()),
    )?;

    let y_map: Vec<usize> = nearest_indices(height, new_height).collect();

    if input.dtype() == crate::Dtype::Uint8 && input.is_contiguous() {
        debug!(
            "resizing {}x{} u8 image to {}x{} ({} kernel)",
            width,
            height,
            new_width,
            new_height,
            isa.name()
        );
        let x_map: Vec<i32> = nearest_indices(width, new_width)
            .map(|x| x as i32)
            .collect();
        let channels = if dims == 3 { input.shape()[0] as usize } else { 1 };
        let src = PlanarSpan3D::new(input.as_span1d::<u8>()?, channels, height, width)
            .ok_or_else(|| Error::invalid_argument("input does not match its shape"))?;
        let mut dst = output.as_view_mut()?;
        if dims == 2 {
            dst.unsqueeze(0)?;
        }
        let mut dst = dst.as_planar_span3d_mut::<u8>()?;
        for c in 0..channels {
            let src_plane = src.plane(c);
            let mut dst_plane = dst.plane_mut(c);
            for (dst_row, &y) in dst_plane.rows_mut().zip(&y_map) {
                ptensor_simd::resize_row_nearest_u8(isa, src_plane.row(y), &x_map, dst_row);
            }
        }
        return Ok(());
    }

    debug!(
        "resizing {}x{} {} image to {}x{} (generic kernel)",
        width,
        height,
        input.dtype(),
        new_width,
        new_height
    );
    let x_map: Vec<usize> = nearest_indices(width, new_width).collect();
    let mut src = input.as_view();
    let mut dst = output.as_view_mut()?;
    if dims == 2 {
        src.unsqueeze(0)?;
        dst.unsqueeze(0)?;
    }
    dispatch_dtype!(input.dtype(), T => {
        let src = src.as_accessor3d::<T>()?;
        let mut dst = dst.as_planar_span3d_mut::<T>()?;
        for c in 0..src.shape()[0] {
            let src_plane = src.plane(c);
            let mut dst_plane = dst.plane_mut(c);
            for (dst_row, &y) in dst_plane.rows_mut().zip(&y_map) {
                let src_row = src_plane.row(y);
                for (out, &x) in dst_row.iter_mut().zip(&x_map) {
                    *out = src_row[x];
                }
            }
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use ptensor_bench::run_bench_bytes;
    use ptensor_simd::{available_isas, Isa};
    use ptensor_testing::TestCases;

    use super::{nearest_indices, resize, resize_with_isa};
    use crate::{Dtype, ErrorKind, Shape, Stride, Tensor, TensorOptions};

    #[test]
    fn test_nearest_indices() {
        #[derive(Debug)]
        struct Case {
            src_len: usize,
            dst_len: usize,
            expected: Vec<usize>,
        }

        let cases = [
            Case {
                src_len: 4,
                dst_len: 4,
                expected: vec![0, 1, 2, 3],
            },
            Case {
                src_len: 4,
                dst_len: 2,
                expected: vec![0, 2],
            },
            Case {
                src_len: 2,
                dst_len: 4,
                expected: vec![0, 0, 1, 1],
            },
            Case {
                src_len: 3,
                dst_len: 5,
                expected: vec![0, 0, 1, 1, 2],
            },
            Case {
                src_len: 1,
                dst_len: 3,
                expected: vec![0, 0, 0],
            },
        ];

        cases.test_each(|case| {
            let indices: Vec<_> = nearest_indices(case.src_len, case.dst_len).collect();
            assert_eq!(indices, case.expected);
        })
    }

    #[test]
    fn test_resize_u8_upscale() {
        let input = Tensor::from_data(&[1u8, 2, 3, 4], Shape::new(&[1, 2, 2]).unwrap()).unwrap();
        for isa in available_isas() {
            let mut output = Tensor::default();
            resize_with_isa(&input, &mut output, 4, 4, isa).unwrap();
            assert_eq!(output.shape().as_slice(), &[1, 4, 4]);
            assert_eq!(
                output.as_span1d::<u8>().unwrap(),
                &[1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]
            );
        }
    }

    #[test]
    fn test_resize_wide_rows_use_all_isas() {
        // Rows wider than a vector so that the gather path is used.
        let width = 37;
        let input = Tensor::from_range(
            Shape::new(&[2, 3, width]).unwrap(),
            0,
            Dtype::Uint8,
        )
        .unwrap();
        let mut expected = Tensor::default();
        resize_with_isa(&input, &mut expected, 20, 5, Isa::scalar()).unwrap();
        for isa in available_isas() {
            let mut output = Tensor::default();
            resize_with_isa(&input, &mut output, 20, 5, isa).unwrap();
            assert_eq!(
                output.as_span1d::<u8>().unwrap(),
                expected.as_span1d::<u8>().unwrap()
            );
        }
    }

    #[test]
    fn test_resize_2d_float() {
        let input =
            Tensor::from_data(&[1.0f32, 2.0, 3.0, 4.0], Shape::new(&[2, 2]).unwrap()).unwrap();
        let mut output = Tensor::default();
        resize(&input, &mut output, 1, 2).unwrap();
        assert_eq!(output.shape().as_slice(), &[2, 1]);
        assert_eq!(output.as_span1d::<f32>().unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_resize_non_contiguous_u8() {
        // A (1, 2, 2) view with transposed spatial strides.
        let mut data = [1u8, 2, 3, 4];
        let input = unsafe {
            Tensor::from_raw_parts(
                data.as_mut_ptr(),
                Shape::new(&[1, 2, 2]).unwrap(),
                TensorOptions::new()
                    .dtype(Dtype::Uint8)
                    .stride(Stride::new(&[4, 1, 2]).unwrap()),
                None,
            )
        }
        .unwrap();
        assert!(!input.is_contiguous());

        let mut output = Tensor::default();
        resize(&input, &mut output, 2, 2).unwrap();
        assert_eq!(output.as_span1d::<u8>().unwrap(), &[1, 3, 2, 4]);
    }

    #[test]
    fn test_resize_invalid() {
        #[derive(Debug)]
        struct Case {
            shape: Vec<i64>,
            new_width: usize,
            new_height: usize,
        }

        let cases = [
            Case {
                shape: vec![4],
                new_width: 2,
                new_height: 2,
            },
            Case {
                shape: vec![1, 1, 2, 2],
                new_width: 2,
                new_height: 2,
            },
            Case {
                shape: vec![2, 2],
                new_width: 0,
                new_height: 2,
            },
            Case {
                shape: vec![0, 2],
                new_width: 2,
                new_height: 2,
            },
        ];

        cases.test_each(|case| {
            let input = Tensor::zeros(Shape::new(&case.shape).unwrap(), Dtype::Uint8).unwrap();
            let mut output = Tensor::default();
            let err = resize(&input, &mut output, case.new_width, case.new_height).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        })
    }

    proptest! {
        #[test]
        fn test_resize_identity(
            channels in 1i64..4,
            height in 1i64..20,
            width in 1i64..40,
            float in any::<bool>(),
        ) {
            let dtype = if float { Dtype::Float32 } else { Dtype::Uint8 };
            let shape = Shape::new(&[channels, height, width]).unwrap();
            let input = Tensor::from_range(shape, 0, dtype).unwrap();
            for isa in available_isas() {
                let mut output = Tensor::default();
                resize_with_isa(&input, &mut output, width as usize, height as usize, isa).unwrap();
                prop_assert_eq!(output.shape(), input.shape());
                prop_assert_eq!(output.as_bytes().unwrap(), input.as_bytes().unwrap());
            }
        }
    }

    #[test]
    #[ignore]
    fn bench_resize_u8() {
        let input = Tensor::from_range(Shape::new(&[3, 480, 640]).unwrap(), 0, Dtype::Uint8)
            .unwrap();
        let mut output = Tensor::default();
        let (new_width, new_height) = (1280, 960);
        for isa in available_isas() {
            run_bench_bytes(
                20,
                format!("resize u8 640x480 -> 1280x960 ({})", isa.name()),
                3 * new_width * new_height,
                || {
                    resize_with_isa(&input, &mut output, new_width, new_height, isa).unwrap();
                },
            );
        }
    }
}
