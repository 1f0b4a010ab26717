//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    // Fast path: no expansion needed
    if !value.contains("${") {
        return Ok(value.to_string());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_string(),
            }),
        }
    })
    .map(|cow| cow.into_owned())
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_string(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("WEPRESS_TEST_APPID", "wx42");
        }
        let result = expand_env("${WEPRESS_TEST_APPID}", "account.appid").unwrap();
        assert_eq!(result, "wx42");
        unsafe {
            std::env::remove_var("WEPRESS_TEST_APPID");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("WEPRESS_TEST_UNSET");
        }
        let result = expand_env("${WEPRESS_TEST_UNSET:-fallback}", "account.secret").unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("WEPRESS_TEST_MISSING");
        }
        let result = expand_env("${WEPRESS_TEST_MISSING}", "account.secret");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("WEPRESS_TEST_MISSING"));
        assert!(err.to_string().contains("account.secret"));
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("literal string", "account.appid").unwrap();
        assert_eq!(result, "literal string");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        // $VAR without braces should not be expanded
        let result = expand_env("$VAR", "account.appid").unwrap();
        assert_eq!(result, "$VAR");
    }
}
