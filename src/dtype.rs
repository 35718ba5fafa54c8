//! Scalar element types and dispatch from a runtime [`Dtype`] to code that is
//! generic over the element type.

use std::fmt;
use std::str::FromStr;

use half::f16;

use crate::errors::{Error, Result};

/// Evaluate `$body` with `$T` bound to the element type of a [`Dtype`].
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::Dtype::Float32 => {
                type $T = f32;
                $body
            }
            $crate::Dtype::Float64 => {
                type $T = f64;
                $body
            }
            $crate::Dtype::Float16 => {
                type $T = half::f16;
                $body
            }
            $crate::Dtype::Uint8 => {
                type $T = u8;
                $body
            }
            $crate::Dtype::Uint16 => {
                type $T = u16;
                $body
            }
            $crate::Dtype::Uint32 => {
                type $T = u32;
                $body
            }
            $crate::Dtype::Int8 => {
                type $T = i8;
                $body
            }
            $crate::Dtype::Int16 => {
                type $T = i16;
                $body
            }
            $crate::Dtype::Int32 => {
                type $T = i32;
                $body
            }
            $crate::Dtype::Int64 => {
                type $T = i64;
                $body
            }
        }
    };
}
pub(crate) use dispatch_dtype;

/// Scalar element type of a tensor.
///
/// Discriminants are stable numeric codes, see [`Dtype::code`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Dtype {
    #[default]
    Float32 = 0,
    Float64 = 1,
    Float16 = 2,
    Uint8 = 3,
    Uint16 = 4,
    Uint32 = 5,
    Int8 = 6,
    Int16 = 7,
    Int32 = 8,
    Int64 = 9,
}

impl Dtype {
    /// All data types, in code order.
    pub const ALL: [Dtype; 10] = [
        Dtype::Float32,
        Dtype::Float64,
        Dtype::Float16,
        Dtype::Uint8,
        Dtype::Uint16,
        Dtype::Uint32,
        Dtype::Int8,
        Dtype::Int16,
        Dtype::Int32,
        Dtype::Int64,
    ];

    /// Return the data type of element type `T`.
    pub fn of<T: Element>() -> Dtype {
        T::DTYPE
    }

    /// Return the size of one element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            Dtype::Uint8 | Dtype::Int8 => 1,
            Dtype::Float16 | Dtype::Uint16 | Dtype::Int16 => 2,
            Dtype::Float32 | Dtype::Uint32 | Dtype::Int32 => 4,
            Dtype::Float64 | Dtype::Int64 => 8,
        }
    }

    /// Return the element size for a raw dtype code, or 0 if the code is not
    /// valid.
    pub fn size_bytes_of_code(code: u8) -> usize {
        Dtype::try_from(code).map_or(0, Dtype::size_bytes)
    }

    /// Return the numeric code of this type.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Return the lowercase name of this type, eg. "float32".
    pub fn name(self) -> &'static str {
        match self {
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::Float16 => "float16",
            Dtype::Uint8 => "uint8",
            Dtype::Uint16 => "uint16",
            Dtype::Uint32 => "uint32",
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, Dtype::Float16 | Dtype::Float32 | Dtype::Float64)
    }

    pub fn is_integral(self) -> bool {
        !self.is_floating_point()
    }

    /// Reinterpret `bytes` as a slice of this type's elements and pass it to
    /// `visitor`.
    ///
    /// Trailing bytes which do not form a whole element are ignored. Fails
    /// with [`InvalidArgument`](crate::ErrorKind::InvalidArgument) if `bytes`
    /// is not aligned for the element type.
    pub fn visit<V: ElementVisitor>(self, bytes: &[u8], visitor: V) -> Result<V::Output> {
        let len = bytes.len() - bytes.len() % self.size_bytes();
        dispatch_dtype!(self, T => {
            let elements: &[T] = bytemuck::try_cast_slice(&bytes[..len]).map_err(misaligned)?;
            Ok(visitor.visit(elements))
        })
    }

    /// Mutable variant of [`visit`](Dtype::visit).
    pub fn visit_mut<V: ElementVisitorMut>(
        self,
        bytes: &mut [u8],
        visitor: V,
    ) -> Result<V::Output> {
        let len = bytes.len() - bytes.len() % self.size_bytes();
        dispatch_dtype!(self, T => {
            let elements: &mut [T] =
                bytemuck::try_cast_slice_mut(&mut bytes[..len]).map_err(misaligned)?;
            Ok(visitor.visit(elements))
        })
    }

    /// Call the integer or floating point branch of `matcher` with this
    /// type's element type.
    pub fn match_type<M: TypeMatcher>(self, matcher: M) -> M::Output {
        match self {
            Dtype::Float32 => matcher.match_float::<f32>(),
            Dtype::Float64 => matcher.match_float::<f64>(),
            Dtype::Float16 => matcher.match_float::<f16>(),
            Dtype::Uint8 => matcher.match_int::<u8>(),
            Dtype::Uint16 => matcher.match_int::<u16>(),
            Dtype::Uint32 => matcher.match_int::<u32>(),
            Dtype::Int8 => matcher.match_int::<i8>(),
            Dtype::Int16 => matcher.match_int::<i16>(),
            Dtype::Int32 => matcher.match_int::<i32>(),
            Dtype::Int64 => matcher.match_int::<i64>(),
        }
    }
}

fn misaligned(err: bytemuck::PodCastError) -> Error {
    Error::invalid_argument(format!("cannot view bytes as elements: {:?}", err))
}

impl TryFrom<u8> for Dtype {
    type Error = Error;

    fn try_from(code: u8) -> Result<Dtype> {
        Dtype::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| Error::invalid_argument(format!("invalid dtype code {}", code)))
    }
}

impl FromStr for Dtype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Dtype> {
        Dtype::ALL
            .into_iter()
            .find(|dtype| dtype.name() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown dtype \"{}\"", s)))
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Native Rust type which can be stored in a tensor.
pub trait Element:
    bytemuck::Pod
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
{
    /// Data type tag for this element type.
    const DTYPE: Dtype;

    /// Convert from `f64`. Integer types saturate and truncate towards zero.
    fn from_f64(value: f64) -> Self;

    /// Convert from `i64`. Integer types wrap.
    fn from_i64(value: i64) -> Self;

    fn to_f64(self) -> f64;

    /// Map 64 random bits to a value. Floats are uniform in `[0, 1)`, integers
    /// take the low bits.
    fn from_random_bits(bits: u64) -> Self;

    /// Addition. Integer types wrap on overflow.
    fn add_wrapping(self, rhs: Self) -> Self;

    /// Subtraction. Integer types wrap on overflow.
    fn sub_wrapping(self, rhs: Self) -> Self;

    /// Multiplication. Integer types wrap on overflow.
    fn mul_wrapping(self, rhs: Self) -> Self;
}

/// Marker for integer element types.
pub trait IntElement: Element {}

/// Marker for floating point element types.
pub trait FloatElement: Element {}

macro_rules! impl_int_element {
    ($($ty:ty => $dtype:ident),*) => {
        $(
            impl Element for $ty {
                const DTYPE: Dtype = Dtype::$dtype;

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn from_i64(value: i64) -> Self {
                    value as $ty
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_random_bits(bits: u64) -> Self {
                    bits as $ty
                }

                fn add_wrapping(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn sub_wrapping(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn mul_wrapping(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }
            }

            impl IntElement for $ty {}
        )*
    };
}

impl_int_element!(
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64
);

macro_rules! impl_float_element {
    ($ty:ty, $dtype:ident, from_f64: $from_f64:expr, to_f64: $to_f64:expr, from_bits: $from_bits:expr) => {
        impl Element for $ty {
            const DTYPE: Dtype = Dtype::$dtype;

            fn from_f64(value: f64) -> Self {
                $from_f64(value)
            }

            fn from_i64(value: i64) -> Self {
                $from_f64(value as f64)
            }

            fn to_f64(self) -> f64 {
                $to_f64(self)
            }

            fn from_random_bits(bits: u64) -> Self {
                $from_bits(bits)
            }

            fn add_wrapping(self, rhs: Self) -> Self {
                self + rhs
            }

            fn sub_wrapping(self, rhs: Self) -> Self {
                self - rhs
            }

            fn mul_wrapping(self, rhs: Self) -> Self {
                self * rhs
            }
        }

        impl FloatElement for $ty {}
    };
}

impl_float_element!(
    f32,
    Float32,
    from_f64: |x: f64| x as f32,
    to_f64: |x: f32| x as f64,
    from_bits: |bits: u64| (bits >> 40) as f32 / (1u64 << 24) as f32
);
impl_float_element!(
    f64,
    Float64,
    from_f64: |x: f64| x,
    to_f64: |x: f64| x,
    from_bits: |bits: u64| (bits >> 11) as f64 / (1u64 << 53) as f64
);
impl_float_element!(
    f16,
    Float16,
    from_f64: f16::from_f64,
    to_f64: f16::to_f64,
    from_bits: |bits: u64| f16::from_f32((bits >> 53) as f32 / (1u64 << 11) as f32)
);

/// Operation which is generic over the element type of a slice.
///
/// See [`Dtype::visit`].
pub trait ElementVisitor {
    type Output;

    fn visit<T: Element>(self, elements: &[T]) -> Self::Output;
}

/// Operation which is generic over the element type of a mutable slice.
///
/// See [`Dtype::visit_mut`].
pub trait ElementVisitorMut {
    type Output;

    fn visit<T: Element>(self, elements: &mut [T]) -> Self::Output;
}

/// Operation with separate implementations for integer and floating point
/// element types.
///
/// See [`Dtype::match_type`].
pub trait TypeMatcher {
    type Output;

    fn match_int<T: IntElement>(self) -> Self::Output;
    fn match_float<T: FloatElement>(self) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use half::f16;
    use ptensor_testing::TestCases;

    use super::{
        Dtype, Element, ElementVisitor, ElementVisitorMut, FloatElement, IntElement, TypeMatcher,
    };
    use crate::ErrorKind;

    #[test]
    fn test_size_bytes() {
        #[derive(Debug)]
        struct Case {
            dtype: Dtype,
            size: usize,
        }

        let cases = [
            Case { dtype: Dtype::Uint8, size: 1 },
            Case { dtype: Dtype::Int8, size: 1 },
            Case { dtype: Dtype::Float16, size: 2 },
            Case { dtype: Dtype::Uint16, size: 2 },
            Case { dtype: Dtype::Int16, size: 2 },
            Case { dtype: Dtype::Uint32, size: 4 },
            Case { dtype: Dtype::Int32, size: 4 },
            Case { dtype: Dtype::Float32, size: 4 },
            Case { dtype: Dtype::Int64, size: 8 },
            Case { dtype: Dtype::Float64, size: 8 },
        ];

        cases.test_each(|case| {
            assert_eq!(case.dtype.size_bytes(), case.size);
            assert_eq!(Dtype::size_bytes_of_code(case.dtype.code()), case.size);
        })
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(Dtype::size_bytes_of_code(255), 0);
        assert_eq!(Dtype::size_bytes_of_code(10), 0);
        let err = Dtype::try_from(255).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_codes_round_trip() {
        for dtype in Dtype::ALL {
            assert_eq!(Dtype::try_from(dtype.code()).unwrap(), dtype);
            assert_eq!(dtype.name().parse::<Dtype>().unwrap(), dtype);
            assert_eq!(dtype.to_string(), dtype.name());
        }
        assert_eq!(Dtype::default(), Dtype::Float32);
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "complex64".parse::<Dtype>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_of() {
        assert_eq!(Dtype::of::<f32>(), Dtype::Float32);
        assert_eq!(Dtype::of::<f16>(), Dtype::Float16);
        assert_eq!(Dtype::of::<u8>(), Dtype::Uint8);
        assert_eq!(Dtype::of::<i64>(), Dtype::Int64);
        assert!(Dtype::Float16.is_floating_point());
        assert!(Dtype::Int8.is_integral());
    }

    struct Sum;

    impl ElementVisitor for Sum {
        type Output = f64;

        fn visit<T: Element>(self, elements: &[T]) -> f64 {
            elements.iter().map(|x| x.to_f64()).sum()
        }
    }

    struct Increment;

    impl ElementVisitorMut for Increment {
        type Output = usize;

        fn visit<T: Element>(self, elements: &mut [T]) -> usize {
            for x in elements.iter_mut() {
                *x = T::from_f64(x.to_f64() + 1.);
            }
            elements.len()
        }
    }

    #[test]
    fn test_visit() {
        let values = [1i32, 2, 3];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        assert_eq!(Dtype::Int32.visit(bytes, Sum).unwrap(), 6.);

        // Incomplete trailing elements are ignored.
        assert_eq!(Dtype::Int32.visit(&bytes[..10], Sum).unwrap(), 3.);

        let mut values = [1.5f64, 2.5];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut values);
        assert_eq!(Dtype::Float64.visit_mut(bytes, Increment).unwrap(), 2);
        assert_eq!(values, [2.5, 3.5]);
    }

    #[test]
    fn test_visit_misaligned() {
        let values = [0u32; 4];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let err = Dtype::Int32.visit(&bytes[1..], Sum).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    struct Describe;

    impl TypeMatcher for Describe {
        type Output = (&'static str, usize);

        fn match_int<T: IntElement>(self) -> Self::Output {
            ("int", std::mem::size_of::<T>())
        }

        fn match_float<T: FloatElement>(self) -> Self::Output {
            ("float", std::mem::size_of::<T>())
        }
    }

    #[test]
    fn test_match_type() {
        for dtype in Dtype::ALL {
            let (kind, size) = dtype.match_type(Describe);
            assert_eq!(kind == "float", dtype.is_floating_point());
            assert_eq!(size, dtype.size_bytes());
        }
    }

    #[test]
    fn test_element_conversions() {
        assert_eq!(u8::from_f64(300.), 255);
        assert_eq!(i8::from_f64(-1.7), -1);
        assert_eq!(u8::from_i64(257), 1);
        assert_eq!(f16::from_i64(3).to_f64(), 3.);
        assert_eq!(i32::MAX.add_wrapping(1), i32::MIN);
        assert_eq!(2.5f32.mul_wrapping(2.), 5.);
    }

    #[test]
    fn test_random_bits_in_unit_interval() {
        for bits in [0, u64::MAX, 1 << 63, 12345] {
            let x = f32::from_random_bits(bits);
            assert!((0. ..1.).contains(&x), "{}", x);
            let x = f64::from_random_bits(bits);
            assert!((0. ..1.).contains(&x), "{}", x);
            let x = f16::from_random_bits(bits).to_f64();
            assert!((0. ..1.).contains(&x), "{}", x);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        for dtype in Dtype::ALL {
            let json = serde_json::to_string(&dtype).unwrap();
            // Serialized names match `Display` and `FromStr`.
            assert_eq!(json, format!("\"{}\"", dtype));
            let parsed: Dtype = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, dtype);
        }
        assert_eq!(serde_json::to_string(&Dtype::Uint16).unwrap(), "\"uint16\"");
        assert!(serde_json::from_str::<Dtype>("\"Float32\"").is_err());
    }
}
