#![allow(clippy::must_use_candidate)]

//! Translation of request errors into JSON error responses
//!
//! [`ErrorTranslator`] walks an ordered rule table, most specific category
//! first, and produces a [`Translation`]: the status and optional body to
//! send, or nothing when the response is already committed.

mod log;
mod rules;

use std::fmt;
use std::sync::Arc;

use faultline_config::{DEFAULT_UPSTREAM_BODY_LIMIT, DEFAULT_UPSTREAM_TRACE_LIMIT, ErrorHandlingConfig};
use faultline_core::{ApiError, ErrorResponse, RequestContext};
use http::StatusCode;

pub use log::{CapturingLog, FailureLog, LogRecord, TracingLog};

/// Outcome of translating one error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Send `status`, with `body` unless it was suppressed
    Respond {
        status: StatusCode,
        body: Option<ErrorResponse>,
    },
    /// The caller already received response bytes; write nothing
    AlreadyCommitted,
}

impl Translation {
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Respond { status, .. } => Some(*status),
            Self::AlreadyCommitted => None,
        }
    }

    pub const fn body(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Respond { body, .. } => body.as_ref(),
            Self::AlreadyCommitted => None,
        }
    }
}

/// Maps errors raised during request handling to HTTP responses
///
/// Immutable after construction and shared behind an `Arc`. Translation is
/// synchronous and never fails.
#[derive(Clone)]
pub struct ErrorTranslator {
    security: bool,
    upstream_body_limit: usize,
    upstream_trace_limit: usize,
    log: Arc<dyn FailureLog>,
}

impl fmt::Debug for ErrorTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorTranslator")
            .field("security", &self.security)
            .field("upstream_body_limit", &self.upstream_body_limit)
            .field("upstream_trace_limit", &self.upstream_trace_limit)
            .finish_non_exhaustive()
    }
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ErrorTranslator {
    pub fn builder() -> ErrorTranslatorBuilder {
        ErrorTranslatorBuilder::default()
    }

    /// Translator configured from the `[errors]` section, logging through `tracing`
    pub fn from_config(config: &ErrorHandlingConfig) -> Self {
        Self::builder()
            .access_denied(config.access_denied)
            .upstream_body_limit(config.upstream_body_limit)
            .upstream_trace_limit(config.upstream_trace_limit)
            .build()
    }

    /// Translate `error` raised while serving the request behind `ctx`
    pub fn translate(&self, error: &ApiError, ctx: &RequestContext) -> Translation {
        let rule = rules::select(self, error);
        tracing::trace!(rule = rule.name, category = %error.category(), "translating error");

        match (rule.apply)(self, error, ctx) {
            Translation::Respond { status, .. } if status == StatusCode::NO_CONTENT => {
                Translation::Respond { status, body: None }
            }
            translation => translation,
        }
    }

    /// Whether the access-denied rule is active
    pub const fn security_enabled(&self) -> bool {
        self.security
    }
}

/// Composition-time options for [`ErrorTranslator`]
#[derive(Clone)]
pub struct ErrorTranslatorBuilder {
    security: bool,
    upstream_body_limit: usize,
    upstream_trace_limit: usize,
    log: Arc<dyn FailureLog>,
}

impl Default for ErrorTranslatorBuilder {
    fn default() -> Self {
        Self {
            security: true,
            upstream_body_limit: DEFAULT_UPSTREAM_BODY_LIMIT,
            upstream_trace_limit: DEFAULT_UPSTREAM_TRACE_LIMIT,
            log: Arc::new(TracingLog),
        }
    }
}

impl ErrorTranslatorBuilder {
    /// Enable the access-denied rule; when off, access-denied errors fall back to 500
    #[must_use]
    pub const fn access_denied(mut self, enabled: bool) -> Self {
        self.security = enabled;
        self
    }

    /// Maximum characters of an upstream body echoed into the message
    #[must_use]
    pub const fn upstream_body_limit(mut self, limit: usize) -> Self {
        self.upstream_body_limit = limit;
        self
    }

    /// Maximum trace frames attached to an upstream failure
    #[must_use]
    pub const fn upstream_trace_limit(mut self, limit: usize) -> Self {
        self.upstream_trace_limit = limit;
        self
    }

    #[must_use]
    pub fn log(mut self, log: Arc<dyn FailureLog>) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> ErrorTranslator {
        ErrorTranslator {
            security: self.security,
            upstream_body_limit: self.upstream_body_limit,
            upstream_trace_limit: self.upstream_trace_limit,
            log: self.log,
        }
    }
}
