//! `${VAR}` / `${VAR:-default}` expansion for string options.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Bare `$VAR` is left alone; only the braced form is expanded. `field` names
/// the option in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |var: &str| -> Result<Option<String>, String> {
        std::env::var(var).map(Some).map_err(|_| var.to_owned())
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_placeholder_unchanged() {
        let url = "https://docs.example.com/$latest/";
        assert_eq!(expand_env(url, "render.base_url").unwrap(), url);
    }

    #[test]
    fn test_expands_host() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUILL_EXPAND_HOST", "intranet");
        }
        let result = expand_env("https://${QUILL_EXPAND_HOST}/wiki/", "render.base_url").unwrap();
        assert_eq!(result, "https://intranet/wiki/");
        unsafe {
            std::env::remove_var("QUILL_EXPAND_HOST");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUILL_EXPAND_UNSET");
        }
        let result =
            expand_env("${QUILL_EXPAND_UNSET:-https://localhost/}", "render.base_url").unwrap();
        assert_eq!(result, "https://localhost/");
    }

    #[test]
    fn test_missing_var_names_field_and_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUILL_EXPAND_MISSING");
        }
        let err = expand_env("${QUILL_EXPAND_MISSING}", "render.base_url").unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(message.contains("QUILL_EXPAND_MISSING"));
        assert!(message.contains("render.base_url"));
    }
}
