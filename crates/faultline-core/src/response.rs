use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::trace::StackFrame;

/// JSON error body returned to API consumers
///
/// At most one detail payload is attached. The detail is flattened into the
/// object, so a body carries either an `errors` array, a `trace` array, or
/// neither; absent details are omitted rather than serialized as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Request path plus query string, `null` outside an HTTP request
    pub path: Option<String>,
    /// Mirrors the response status line
    pub status: u16,
    /// Stable machine-readable identifier
    pub code: String,
    /// Human-readable message
    pub message: Option<String>,
    /// Optional diagnostic payload
    #[serde(flatten)]
    pub detail: Option<Detail>,
}

/// Diagnostic payload attached to an error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Detail {
    /// One entry per failed validation rule, in input order
    Errors(Vec<FieldError>),
    /// Leading frames of the captured stack trace
    Trace(Vec<StackFrame>),
}

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Rule identifier (e.g. `NotBlank`, `Size`)
    pub code: String,
    /// Name of the validated object
    pub object_name: String,
    /// Offending field, `None` for object-level failures
    pub field: Option<String>,
    /// Default human-readable message for the rule
    pub default_message: Option<String>,
}

impl FieldError {
    /// Failure bound to a single field of the validated object
    pub fn field(
        object_name: impl Into<String>,
        field: impl Into<String>,
        code: impl Into<String>,
        default_message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            object_name: object_name.into(),
            field: Some(field.into()),
            default_message: Some(default_message.into()),
        }
    }

    /// Failure of a rule spanning the whole object
    pub fn object(object_name: impl Into<String>, code: impl Into<String>, default_message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            object_name: object_name.into(),
            field: None,
            default_message: Some(default_message.into()),
        }
    }
}

impl ErrorResponse {
    pub fn new(path: Option<String>, status: StatusCode, code: impl Into<String>, message: Option<String>) -> Self {
        Self {
            path,
            status: status.as_u16(),
            code: code.into(),
            message,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Option<Detail>) -> Self {
        self.detail = detail;
        self
    }

    /// Field errors, when this body carries them
    pub fn errors(&self) -> Option<&[FieldError]> {
        match &self.detail {
            Some(Detail::Errors(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Trace frames, when this body carries them
    pub fn trace(&self) -> Option<&[StackFrame]> {
        match &self.detail {
            Some(Detail::Trace(frames)) => Some(frames),
            _ => None,
        }
    }
}
