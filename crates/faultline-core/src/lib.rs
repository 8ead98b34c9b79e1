#![allow(clippy::must_use_candidate)]

//! Error taxonomy and wire model for Faultline
//!
//! Handlers raise [`ApiError`]s; the translator turns them into
//! [`ErrorResponse`] bodies. Both sides meet here so that neither depends on
//! the other.

mod context;
mod failure;
mod response;
mod trace;

#[cfg(feature = "axum")]
pub mod extract;
#[cfg(feature = "axum")]
mod into_response;
#[cfg(feature = "reqwest")]
mod upstream;
#[cfg(feature = "validator")]
mod validate;

pub use context::{CommitFlag, RequestContext};
pub use failure::{
    AccessDenied, ApiError, AsyncTimeout, Category, DomainError, ErrorKind, MalformedBody, TaskRejected,
    UpstreamFailure, ValidationFailure,
};
#[cfg(feature = "axum")]
pub use into_response::PendingFailure;
pub use response::{Detail, ErrorResponse, FieldError};
pub use trace::{StackFrame, StackTrace};
