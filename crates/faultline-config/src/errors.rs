use serde::Deserialize;

/// Maximum characters of an upstream response body echoed into the message
pub const DEFAULT_UPSTREAM_BODY_LIMIT: usize = 10_000;

/// Maximum trace frames attached to an upstream call failure
pub const DEFAULT_UPSTREAM_TRACE_LIMIT: usize = 15;

/// Error translation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorHandlingConfig {
    /// Install the translator ahead of the framework's default error handling
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the security layer is linked; enables the access-denied rule
    #[serde(default = "default_true")]
    pub access_denied: bool,
    #[serde(default = "default_upstream_body_limit")]
    pub upstream_body_limit: usize,
    #[serde(default = "default_upstream_trace_limit")]
    pub upstream_trace_limit: usize,
}

impl Default for ErrorHandlingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            access_denied: true,
            upstream_body_limit: DEFAULT_UPSTREAM_BODY_LIMIT,
            upstream_trace_limit: DEFAULT_UPSTREAM_TRACE_LIMIT,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_upstream_body_limit() -> usize {
    DEFAULT_UPSTREAM_BODY_LIMIT
}

#[allow(clippy::missing_const_for_fn)]
fn default_upstream_trace_limit() -> usize {
    DEFAULT_UPSTREAM_TRACE_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config: ErrorHandlingConfig = toml::from_str("").unwrap();

        assert!(config.enabled);
        assert!(config.access_denied);
        assert_eq!(config.upstream_body_limit, 10_000);
        assert_eq!(config.upstream_trace_limit, 15);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config: ErrorHandlingConfig = toml::from_str(
            r"
            enabled = false
            access_denied = false
            upstream_body_limit = 256
            upstream_trace_limit = 4
            ",
        )
        .unwrap();

        assert!(!config.enabled);
        assert!(!config.access_denied);
        assert_eq!(config.upstream_body_limit, 256);
        assert_eq!(config.upstream_trace_limit, 4);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ErrorHandlingConfig, _> = toml::from_str("expose_traces = true");
        assert!(result.is_err());
    }
}
