//! Shared utility functions used across the codebase.

/// Read an environment variable, treating unset and blank values alike.
///
/// Surrounding whitespace is trimmed from the returned value.
pub fn env_var_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Render a serializable value as pretty JSON for terminal output.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_nonempty_ignores_blank_values() {
        std::env::set_var("CLOUD_BUDGETS_TEST_BLANK", "   ");
        assert_eq!(env_var_nonempty("CLOUD_BUDGETS_TEST_BLANK"), None);
        std::env::remove_var("CLOUD_BUDGETS_TEST_BLANK");
    }

    #[test]
    fn env_var_nonempty_trims() {
        std::env::set_var("CLOUD_BUDGETS_TEST_PADDED", " us-west-2 ");
        assert_eq!(
            env_var_nonempty("CLOUD_BUDGETS_TEST_PADDED").as_deref(),
            Some("us-west-2")
        );
        std::env::remove_var("CLOUD_BUDGETS_TEST_PADDED");
    }

    #[test]
    fn env_var_nonempty_unset() {
        assert_eq!(env_var_nonempty("CLOUD_BUDGETS_TEST_NEVER_SET"), None);
    }
}
