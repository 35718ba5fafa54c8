//! Error type shared by all fallible tensor operations.

use std::borrow::Cow;
use std::fmt;

/// Category of an [`Error`].
///
/// The numeric [`code`](ErrorKind::code) of each kind is stable, with zero
/// reserved for success.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownError,
    AssertionError,
    InvalidArgument,
    InvalidOperation,
    OutOfMemory,
    OutOfRange,
    NotImplemented,
    OsError,
    IoError,
}

impl ErrorKind {
    /// Return the stable numeric code for this kind.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::UnknownError => 1,
            ErrorKind::AssertionError => 2,
            ErrorKind::InvalidArgument => 3,
            ErrorKind::InvalidOperation => 4,
            ErrorKind::OutOfMemory => 5,
            ErrorKind::OutOfRange => 6,
            ErrorKind::NotImplemented => 7,
            ErrorKind::OsError => 8,
            ErrorKind::IoError => 9,
        }
    }

    /// Convert a numeric code back into a kind.
    ///
    /// Returns `None` for zero (success) and unknown codes.
    pub fn from_code(code: u8) -> Option<ErrorKind> {
        let kind = match code {
            1 => ErrorKind::UnknownError,
            2 => ErrorKind::AssertionError,
            3 => ErrorKind::InvalidArgument,
            4 => ErrorKind::InvalidOperation,
            5 => ErrorKind::OutOfMemory,
            6 => ErrorKind::OutOfRange,
            7 => ErrorKind::NotImplemented,
            8 => ErrorKind::OsError,
            9 => ErrorKind::IoError,
            _ => return None,
        };
        Some(kind)
    }

    fn description(self) -> &'static str {
        match self {
            ErrorKind::UnknownError => "Unknown error",
            ErrorKind::AssertionError => "Assertion error",
            ErrorKind::InvalidArgument => "Invalid argument",
            ErrorKind::InvalidOperation => "Invalid operation",
            ErrorKind::OutOfMemory => "Out of memory",
            ErrorKind::OutOfRange => "Out of range",
            ErrorKind::NotImplemented => "Not implemented",
            ErrorKind::OsError => "OS error",
            ErrorKind::IoError => "IO error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Error returned by tensor operations.
///
/// Displays as the description of its kind, followed by `": message"` when a
/// message is attached.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}", .message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
}

macro_rules! error_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("Create an [`ErrorKind::", stringify!($kind), "`] error with a message.")]
            pub fn $name(message: impl Into<Cow<'static, str>>) -> Error {
                Error::new(ErrorKind::$kind, message)
            }
        )*
    };
}

impl Error {
    /// Create an error with a message.
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Error {
        let message = message.into();
        Error {
            kind,
            message: (!message.is_empty()).then_some(message),
        }
    }

    error_constructors!(
        unknown => UnknownError,
        invalid_argument => InvalidArgument,
        invalid_operation => InvalidOperation,
        out_of_memory => OutOfMemory,
        out_of_range => OutOfRange,
        not_implemented => NotImplemented,
        os_error => OsError,
        io_error => IoError,
    );

    /// Create an [`ErrorKind::AssertionError`] recording where a check failed.
    pub fn from_assert(message: &str, file: &str, line: u32) -> Error {
        Error::new(
            ErrorKind::AssertionError,
            format!("{} ({}:{})", message, file, line),
        )
    }

    /// Return the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the message attached to this error, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::io_error(err.to_string())
    }
}

/// Result type returned by fallible tensor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Return an [`ErrorKind::AssertionError`] from the enclosing function if a
/// condition does not hold.
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::Error::from_assert($msg, file!(), line!()));
        }
    };
}
pub(crate) use ensure;

#[cfg(test)]
mod tests {
    use ptensor_testing::TestCases;

    use super::{Error, ErrorKind, Result};

    #[test]
    fn test_error_kind_codes() {
        let kinds = [
            ErrorKind::UnknownError,
            ErrorKind::AssertionError,
            ErrorKind::InvalidArgument,
            ErrorKind::InvalidOperation,
            ErrorKind::OutOfMemory,
            ErrorKind::OutOfRange,
            ErrorKind::NotImplemented,
            ErrorKind::OsError,
            ErrorKind::IoError,
        ];
        for (i, kind) in kinds.into_iter().enumerate() {
            assert_eq!(kind.code() as usize, i + 1);
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code(0), None);
        assert_eq!(ErrorKind::from_code(10), None);
    }

    #[test]
    fn test_error_display() {
        #[derive(Debug)]
        struct Case {
            error: Error,
            expected: &'static str,
        }

        let cases = [
            Case {
                error: ErrorKind::InvalidArgument.into(),
                expected: "Invalid argument",
            },
            Case {
                error: Error::out_of_range("axis 3 >= 2"),
                expected: "Out of range: axis 3 >= 2",
            },
            Case {
                error: Error::not_implemented(""),
                expected: "Not implemented",
            },
            Case {
                error: Error::from(std::io::Error::other("disk on fire")),
                expected: "IO error: disk on fire",
            },
        ];

        cases.test_each(|case| {
            assert_eq!(case.error.to_string(), case.expected);
        })
    }

    #[test]
    fn test_ensure() {
        fn check(x: i32) -> Result<i32> {
            ensure!(x > 0, "x must be positive");
            Ok(x)
        }

        assert_eq!(check(1), Ok(1));
        let err = check(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionError);
        let message = err.message().unwrap();
        assert!(message.starts_with("x must be positive ("));
        assert!(message.contains("errors.rs"));
    }
}
