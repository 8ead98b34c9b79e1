use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

/// Failure while substituting `{{ env.VAR }}` placeholders
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// Variable is unset and the placeholder has no default
    #[error("environment variable not found: `{0}`")]
    Missing(String),

    /// Placeholder is scoped to something other than `env.`
    #[error("only variables scoped with 'env.' are supported: `{0}`")]
    UnsupportedScope(String),
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // {{ scope.NAME }} with an optional | default("value")
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#).expect("must be valid regex")
    })
}

/// Substitute `{{ env.VAR }}` placeholders in raw TOML text
///
/// `{{ env.VAR | default("x") }}` falls back to `x` when `VAR` is unset.
/// Comment lines are left untouched so commented-out settings never fail
/// the load.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    let mut lines = Vec::new();

    for line in input.split('\n') {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_owned());
        } else {
            lines.push(expand_line(line)?);
        }
    }

    Ok(lines.join("\n"))
}

fn expand_line(line: &str) -> Result<String, ExpandError> {
    let mut failure = None;

    let expanded = placeholder().replace_all(line, |captures: &Captures<'_>| {
        match resolve(&captures[1], captures.get(2).map(|m| m.as_str())) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, ExpandError> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(ExpandError::UnsupportedScope(key.to_owned()));
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(ExpandError::Missing(name.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[errors]\nenabled = true\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_set_variable() {
        temp_env::with_var("FAULTLINE_TEST_LISTEN", Some("127.0.0.1:8080"), || {
            let result = expand_env("listen_address = \"{{ env.FAULTLINE_TEST_LISTEN }}\"").unwrap();
            assert_eq!(result, "listen_address = \"127.0.0.1:8080\"");
        });
    }

    #[test]
    fn default_applies_when_unset() {
        temp_env::with_var_unset("FAULTLINE_TEST_FILTER", || {
            let result = expand_env("log_filter = \"{{ env.FAULTLINE_TEST_FILTER | default(\"debug\") }}\"").unwrap();
            assert_eq!(result, "log_filter = \"debug\"");
        });
    }

    #[test]
    fn set_variable_wins_over_default() {
        temp_env::with_var("FAULTLINE_TEST_FILTER", Some("warn"), || {
            let result = expand_env("log_filter = \"{{ env.FAULTLINE_TEST_FILTER | default(\"debug\") }}\"").unwrap();
            assert_eq!(result, "log_filter = \"warn\"");
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        temp_env::with_var_unset("FAULTLINE_TEST_MISSING", || {
            let err = expand_env("a = \"{{ env.FAULTLINE_TEST_MISSING }}\"").unwrap_err();
            assert_eq!(err, ExpandError::Missing("FAULTLINE_TEST_MISSING".to_owned()));
        });
    }

    #[test]
    fn foreign_scope_is_an_error() {
        let err = expand_env("a = \"{{ vault.TOKEN }}\"").unwrap_err();
        assert_eq!(err, ExpandError::UnsupportedScope("vault.TOKEN".to_owned()));
    }

    #[test]
    fn comments_are_not_expanded() {
        temp_env::with_var_unset("FAULTLINE_TEST_MISSING", || {
            let input = "  # a = \"{{ env.FAULTLINE_TEST_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
