use crate::dtype::{dispatch_dtype, Element};
use crate::errors::{Error, Result};
use crate::tensor::Tensor;

#[derive(Copy, Clone, Debug)]
enum BinaryOp {
    Add,
    Subtract,
    Multiply,
}

impl BinaryOp {
    fn apply<T: Element>(self, a: T, b: T) -> T {
        match self {
            BinaryOp::Add => a.add_wrapping(b),
            BinaryOp::Subtract => a.sub_wrapping(b),
            BinaryOp::Multiply => a.mul_wrapping(b),
        }
    }
}

fn binary_op(a: &Tensor, b: &Tensor, out: &mut Tensor, op: BinaryOp) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::invalid_argument(format!(
            "shapes {} and {} do not match",
            a.shape(),
            b.shape()
        )));
    }
    if a.dtype() != b.dtype() {
        return Err(Error::invalid_argument(format!(
            "element types {} and {} do not match",
            a.dtype(),
            b.dtype()
        )));
    }

    out.create(*a.shape(), a.dtype())?;
    dispatch_dtype!(a.dtype(), T => {
        let out = out.as_span1d_mut::<T>()?;
        for ((out, &x), &y) in out.iter_mut().zip(a.iter::<T>()?).zip(b.iter::<T>()?) {
            *out = op.apply(x, y);
        }
    });
    Ok(())
}

/// Compute `a + b` elementwise into `out`.
///
/// The inputs must have the same shape and element type, but may have any
/// strides. Integer addition wraps on overflow.
pub fn add(a: &Tensor, b: &Tensor, out: &mut Tensor) -> Result<()> {
    binary_op(a, b, out, BinaryOp::Add)
}

/// Compute `a - b` elementwise into `out`. See [`add`].
pub fn subtract(a: &Tensor, b: &Tensor, out: &mut Tensor) -> Result<()> {
    binary_op(a, b, out, BinaryOp::Subtract)
}

/// Compute `a * b` elementwise into `out`. See [`add`].
pub fn multiply(a: &Tensor, b: &Tensor, out: &mut Tensor) -> Result<()> {
    binary_op(a, b, out, BinaryOp::Multiply)
}

/// Multiply every element of `tensor` by `scalar` in place.
///
/// `scalar` is first converted to the element type, so fractional factors
/// are truncated for integer tensors.
pub fn multiply_scalar(tensor: &mut Tensor, scalar: f64) -> Result<()> {
    dispatch_dtype!(tensor.dtype(), T => {
        let scalar = T::from_f64(scalar);
        for x in tensor.iter_mut::<T>()? {
            *x = x.mul_wrapping(scalar);
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use ptensor_testing::{expect_all_close, TestCases};

    use super::{add, binary_op, multiply_scalar, subtract, BinaryOp};
    use crate::{Dtype, ErrorKind, Shape, Tensor};

    fn shape(extents: &[i64]) -> Shape {
        Shape::new(extents).unwrap()
    }

    #[test]
    fn test_binary_ops() {
        #[derive(Debug)]
        struct Case {
            op: BinaryOp,
            expected: [f32; 4],
        }

        let cases = [
            Case {
                op: BinaryOp::Add,
                expected: [11., 22., 33., 44.],
            },
            Case {
                op: BinaryOp::Subtract,
                expected: [-9., -18., -27., -36.],
            },
            Case {
                op: BinaryOp::Multiply,
                expected: [10., 40., 90., 160.],
            },
        ];

        cases.test_each(|case| {
            let a = Tensor::from_data(&[1f32, 2., 3., 4.], shape(&[2, 2])).unwrap();
            let b = Tensor::from_data(&[10f32, 20., 30., 40.], shape(&[2, 2])).unwrap();
            let mut out = Tensor::default();
            binary_op(&a, &b, &mut out, case.op).unwrap();
            assert_eq!(out.shape(), a.shape());
            assert_eq!(out.as_span1d::<f32>().unwrap(), &case.expected);
        })
    }

    #[test]
    fn test_add_strided_input() {
        let a = Tensor::from_range(shape(&[2, 3]), 0, Dtype::Int32).unwrap();

        // Column 1 of `a` is [1, 4], which is not contiguous.
        let column = a.select_dimension(1, 1).unwrap();
        assert!(!column.is_contiguous());

        let mut out = Tensor::default();
        let ones = Tensor::full(shape(&[2]), 1., Dtype::Int32).unwrap();
        add(&column, &ones, &mut out).unwrap();
        assert!(out.is_contiguous());
        assert_eq!(out.as_span1d::<i32>().unwrap(), &[2, 5]);
    }

    #[test]
    fn test_integer_overflow_wraps() {
        let a = Tensor::from_data(&[250u8, 10], shape(&[2])).unwrap();
        let b = Tensor::from_data(&[10u8, 20], shape(&[2])).unwrap();
        let mut out = Tensor::default();
        add(&a, &b, &mut out).unwrap();
        assert_eq!(out.as_span1d::<u8>().unwrap(), &[4, 30]);
        subtract(&a, &b, &mut out).unwrap();
        assert_eq!(out.as_span1d::<u8>().unwrap(), &[240, 246]);
    }

    #[test]
    fn test_binary_op_mismatch() {
        #[derive(Debug)]
        struct Case {
            b_shape: Vec<i64>,
            b_dtype: Dtype,
        }

        let cases = [
            Case {
                b_shape: vec![3],
                b_dtype: Dtype::Float32,
            },
            Case {
                b_shape: vec![2, 1],
                b_dtype: Dtype::Float32,
            },
            Case {
                b_shape: vec![2],
                b_dtype: Dtype::Float64,
            },
        ];

        cases.test_each(|case| {
            let a = Tensor::zeros(shape(&[2]), Dtype::Float32).unwrap();
            let b = Tensor::zeros(shape(&case.b_shape), case.b_dtype).unwrap();
            let mut out = Tensor::default();
            let err = add(&a, &b, &mut out).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        })
    }

    #[test]
    fn test_multiply_scalar() {
        let mut t = Tensor::from_data(&[1f64, 2., 3.], shape(&[3])).unwrap();
        multiply_scalar(&mut t, 0.5).unwrap();
        let values: Vec<f64> = t.iter::<f64>().unwrap().copied().collect();
        expect_all_close(values.iter().copied(), [0.5, 1.0, 1.5], 1e-12).unwrap();

        let mut t = Tensor::from_data(&[1i16, -2, 3], shape(&[3])).unwrap();
        multiply_scalar(&mut t, 3.).unwrap();
        assert_eq!(t.as_span1d::<i16>().unwrap(), &[3, -6, 9]);
    }

    #[test]
    fn test_multiply_scalar_read_only() {
        let t = Tensor::from_data(&[1f32, 2.], shape(&[2])).unwrap();
        let mut view = t.as_view();
        let err = multiply_scalar(&mut view, 2.).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }
}
