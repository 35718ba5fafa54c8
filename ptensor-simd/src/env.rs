use log::warn;

/// Interpret a string value such as "1" or "no" as a boolean.
///
/// Returns `None` for values that are not recognized.
pub fn str_as_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Return whether a feature flag controlled by an environment variable is
/// enabled.
///
/// Unset variables and unrecognized values yield `default`.
pub fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => str_as_bool(&value).unwrap_or_else(|| {
            warn!("Unrecognized boolean value \"{}\" for {}", value, name);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use ptensor_testing::TestCases;

    use super::{env_flag, str_as_bool};

    #[test]
    fn test_str_as_bool() {
        #[derive(Debug)]
        struct Case {
            value: &'static str,
            expected: Option<bool>,
        }

        let cases = [
            Case { value: "1", expected: Some(true) },
            Case { value: "yes", expected: Some(true) },
            Case { value: "TRUE", expected: Some(true) },
            Case { value: "0", expected: Some(false) },
            Case { value: "n", expected: Some(false) },
            Case { value: "maybe", expected: None },
            Case { value: "", expected: None },
        ];

        cases.test_each(|case| {
            assert_eq!(str_as_bool(case.value), case.expected);
        });
    }

    #[test]
    fn test_env_flag_unset_uses_default() {
        assert!(env_flag("PTENSOR_TEST_FLAG_THAT_IS_NEVER_SET", true));
        assert!(!env_flag("PTENSOR_TEST_FLAG_THAT_IS_NEVER_SET", false));
    }
}
