use std::any::type_name;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::response::FieldError;
use crate::trace::StackTrace;

/// Application errors that declare their own HTTP status and code
///
/// Implemented by each feature's error type. The translator reads the
/// declared status and code, keeping domain errors decoupled from the HTTP
/// layer.
pub trait DomainError: StdError + Send + Sync + 'static {
    /// Declared HTTP status; `None` resolves to 500
    fn declared_status(&self) -> Option<StatusCode> {
        None
    }

    /// Application code exposed to API consumers; `None` falls back to the type name
    fn code(&self) -> Option<Cow<'_, str>> {
        None
    }
}

/// Request payload failed one or more validation rules
#[derive(Debug, Error)]
#[error("validation failed with {} error(s)", .errors.len())]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
    status: StatusCode,
}

impl ValidationFailure {
    pub fn new(errors: impl IntoIterator<Item = FieldError>) -> Self {
        Self {
            errors: errors.into_iter().collect(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

/// Request body could not be read or parsed
#[derive(Debug, Error)]
#[error("malformed request body: {message}")]
pub struct MalformedBody {
    message: String,
    status: StatusCode,
}

impl MalformedBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

/// Asynchronous request processing exceeded its deadline
#[derive(Debug, Default, Error)]
#[error("async request timed out")]
pub struct AsyncTimeout;

/// Work was refused because the executor is at capacity
#[derive(Debug, Error)]
#[error("task rejected: {message}")]
pub struct TaskRejected {
    message: String,
}

/// A call to a dependent service returned an error response
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UpstreamFailure {
    message: String,
    body: String,
}

impl UpstreamFailure {
    pub fn new(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Raw response body returned by the upstream service
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Caller is authenticated but not allowed to perform the operation
#[derive(Debug, Error)]
#[error("access denied: {message}")]
pub struct AccessDenied {
    message: String,
}

/// Error category used to select a translation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Validation,
    MalformedBody,
    AsyncTimeout,
    TaskRejected,
    Domain,
    Upstream,
    AccessDenied,
    Unclassified,
}

/// Tagged error payload
#[derive(Debug)]
pub enum ErrorKind {
    Validation(ValidationFailure),
    MalformedBody(MalformedBody),
    AsyncTimeout(AsyncTimeout),
    TaskRejected(TaskRejected),
    Domain {
        type_name: &'static str,
        error: Box<dyn DomainError>,
    },
    Upstream(UpstreamFailure),
    AccessDenied(AccessDenied),
    Unclassified {
        type_name: &'static str,
        error: Box<dyn StdError + Send + Sync>,
    },
}

/// Error raised while handling a request
///
/// Carries the categorized payload and the stack trace captured where it was
/// constructed. Display and source are transparent over the payload.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    trace: StackTrace,
}

impl ApiError {
    /// Wrap a categorized payload, capturing the current stack trace
    ///
    /// The trace is captured unconditionally; `RUST_BACKTRACE` does not
    /// switch it off.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            trace: StackTrace::force_capture(),
        }
    }

    pub fn validation(errors: impl IntoIterator<Item = FieldError>) -> Self {
        Self::new(ErrorKind::Validation(ValidationFailure::new(errors)))
    }

    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedBody(MalformedBody::new(message)))
    }

    pub fn async_timeout() -> Self {
        Self::new(ErrorKind::AsyncTimeout(AsyncTimeout))
    }

    pub fn task_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TaskRejected(TaskRejected {
            message: message.into(),
        }))
    }

    pub fn domain<E: DomainError>(error: E) -> Self {
        Self::new(ErrorKind::Domain {
            type_name: type_name::<E>(),
            error: Box::new(error),
        })
    }

    pub fn upstream(failure: UpstreamFailure) -> Self {
        Self::new(ErrorKind::Upstream(failure))
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied(AccessDenied {
            message: message.into(),
        }))
    }

    /// Wrap any error that has no dedicated category
    pub fn other<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self::new(ErrorKind::Unclassified {
            type_name: type_name::<E>(),
            error: Box::new(error),
        })
    }

    /// Override the caller-supplied status of a validation or malformed-body error
    ///
    /// Other categories resolve their status themselves; the override is ignored.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        match &mut self.kind {
            ErrorKind::Validation(failure) => failure.status = status,
            ErrorKind::MalformedBody(body) => body.status = status,
            _ => {}
        }
        self
    }

    /// Replace the captured stack trace
    #[must_use]
    pub fn with_trace(mut self, trace: StackTrace) -> Self {
        self.trace = trace;
        self
    }

    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub const fn trace(&self) -> &StackTrace {
        &self.trace
    }

    pub const fn category(&self) -> Category {
        match self.kind {
            ErrorKind::Validation(_) => Category::Validation,
            ErrorKind::MalformedBody(_) => Category::MalformedBody,
            ErrorKind::AsyncTimeout(_) => Category::AsyncTimeout,
            ErrorKind::TaskRejected(_) => Category::TaskRejected,
            ErrorKind::Domain { .. } => Category::Domain,
            ErrorKind::Upstream(_) => Category::Upstream,
            ErrorKind::AccessDenied(_) => Category::AccessDenied,
            ErrorKind::Unclassified { .. } => Category::Unclassified,
        }
    }

    /// Fully qualified identifier of the error's type
    ///
    /// Used as the response code whenever no explicit code applies, so it is
    /// unique per error kind and deterministic for a given build.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ErrorKind::Validation(_) => type_name::<ValidationFailure>(),
            ErrorKind::MalformedBody(_) => type_name::<MalformedBody>(),
            ErrorKind::AsyncTimeout(_) => type_name::<AsyncTimeout>(),
            ErrorKind::TaskRejected(_) => type_name::<TaskRejected>(),
            ErrorKind::Upstream(_) => type_name::<UpstreamFailure>(),
            ErrorKind::AccessDenied(_) => type_name::<AccessDenied>(),
            ErrorKind::Domain { type_name, .. } | ErrorKind::Unclassified { type_name, .. } => *type_name,
        }
    }

    /// The error's own message, `None` when absent or empty
    pub fn message(&self) -> Option<Cow<'_, str>> {
        let message = match &self.kind {
            ErrorKind::Validation(_) | ErrorKind::AsyncTimeout(_) => return None,
            ErrorKind::MalformedBody(body) => Cow::Borrowed(body.message.as_str()),
            ErrorKind::TaskRejected(rejected) => Cow::Borrowed(rejected.message.as_str()),
            ErrorKind::Upstream(failure) => Cow::Borrowed(failure.message.as_str()),
            ErrorKind::AccessDenied(denied) => Cow::Borrowed(denied.message.as_str()),
            ErrorKind::Domain { error, .. } => Cow::Owned(error.to_string()),
            ErrorKind::Unclassified { error, .. } => Cow::Owned(error.to_string()),
        };

        (!message.is_empty()).then_some(message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Validation(failure) => fmt::Display::fmt(failure, f),
            ErrorKind::MalformedBody(body) => fmt::Display::fmt(body, f),
            ErrorKind::AsyncTimeout(timeout) => fmt::Display::fmt(timeout, f),
            ErrorKind::TaskRejected(rejected) => fmt::Display::fmt(rejected, f),
            ErrorKind::Upstream(failure) => write!(f, "upstream call failed: {failure}"),
            ErrorKind::AccessDenied(denied) => fmt::Display::fmt(denied, f),
            ErrorKind::Domain { error, .. } => fmt::Display::fmt(error, f),
            ErrorKind::Unclassified { error, .. } => fmt::Display::fmt(error, f),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::Domain { error, .. } => error.source(),
            ErrorKind::Unclassified { error, .. } => error.source(),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        Self::new(ErrorKind::Validation(failure))
    }
}

impl From<MalformedBody> for ApiError {
    fn from(body: MalformedBody) -> Self {
        Self::new(ErrorKind::MalformedBody(body))
    }
}

impl From<UpstreamFailure> for ApiError {
    fn from(failure: UpstreamFailure) -> Self {
        Self::upstream(failure)
    }
}

impl From<tokio::time::error::Elapsed> for ApiError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::async_timeout()
    }
}

impl From<tokio::sync::TryAcquireError> for ApiError {
    fn from(error: tokio::sync::TryAcquireError) -> Self {
        Self::task_rejected(error.to_string())
    }
}
