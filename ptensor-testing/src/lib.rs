//! Internal testing utilities for the ptensor crates.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Run a table of test cases, collecting failures instead of stopping at the
/// first one.
///
/// Implemented for anything iterable. A test conventionally declares a
/// `Case` struct deriving `Debug`, builds an array of cases and calls one of
/// the `test_each*` methods with a closure that asserts on a single case.
/// Once every case has run the call panics with the number of failures and
/// the debug representation of each failing case.
///
/// ```
/// use ptensor_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case {
///     rows: usize,
///     cols: usize,
///     len: usize,
/// }
///
/// let cases = [
///     Case { rows: 2, cols: 3, len: 6 },
///     Case { rows: 0, cols: 5, len: 0 },
/// ];
///
/// cases.test_each(|&Case { rows, cols, len }| {
///     assert_eq!(rows * cols, len);
/// });
/// ```
///
/// Cases and captured values must be unwind safe. Fields which are not can be
/// wrapped in [`AssertUnwindSafe`](std::panic::AssertUnwindSafe), or replaced
/// by a description from which the value is built inside the test closure.
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call `test` with a reference to each case.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Call `test` with a clone of each case.
    fn test_each_clone(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + Clone + UnwindSafe;

    /// Call `test` with each case by value.
    ///
    /// The debug representation of a case is captured before the call, so
    /// this works for cases that cannot be cloned.
    fn test_each_value(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe;
}

fn report_failures<T: Debug>(failures: &[T]) {
    assert_eq!(
        failures.len(),
        0,
        "{} test cases failed: {:?}",
        failures.len(),
        failures
    );
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let failures: Vec<_> = self
            .into_iter()
            .filter(|case| std::panic::catch_unwind(|| test(case)).is_err())
            .collect();
        report_failures(&failures);
    }

    fn test_each_clone(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Clone + Debug + UnwindSafe,
    {
        let test = &test;
        let failures: Vec<_> = self
            .into_iter()
            .filter(|case| {
                let value = case.clone();
                std::panic::catch_unwind(move || test(value)).is_err()
            })
            .collect();
        report_failures(&failures);
    }

    fn test_each_value(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe,
    {
        let test = &test;
        let mut failures = Vec::new();
        for case in self {
            let case_str = format!("{:?}", case);
            if std::panic::catch_unwind(move || test(case)).is_err() {
                failures.push(case_str);
            }
        }
        report_failures(&failures);
    }
}

/// Check that two float sequences have the same length and that each pair of
/// values differs by at most `tolerance`.
///
/// Returns a description of the first mismatch on failure.
pub fn expect_all_close<A, B>(actual: A, expected: B, tolerance: f64) -> Result<(), String>
where
    A: IntoIterator<Item = f64>,
    B: IntoIterator<Item = f64>,
{
    let actual: Vec<f64> = actual.into_iter().collect();
    let expected: Vec<f64> = expected.into_iter().collect();
    if actual.len() != expected.len() {
        return Err(format!(
            "length mismatch: actual {} expected {}",
            actual.len(),
            expected.len()
        ));
    }
    for (i, (a, e)) in actual.iter().zip(&expected).enumerate() {
        let close = (a.is_nan() && e.is_nan()) || (a - e).abs() <= tolerance;
        if !close {
            return Err(format!(
                "values differ at index {}: actual {} expected {}",
                i, a, e
            ));
        }
    }
    Ok(())
}
