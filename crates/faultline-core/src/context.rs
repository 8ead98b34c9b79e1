use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use http::Uri;

/// Shared marker set once response bytes have reached the caller
///
/// Cloned into handlers through request extensions. A handler that starts
/// streaming a body marks it committed so that a later failure does not
/// attempt a second write.
#[derive(Debug, Clone, Default)]
pub struct CommitFlag(Arc<AtomicBool>);

impl CommitFlag {
    /// Create an uncommitted flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the response as flushed to the caller
    pub fn commit(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the response has been flushed to the caller
    pub fn is_committed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Request-scoped view handed to the translator
///
/// Both parts are optional: errors raised outside an HTTP exchange (background
/// jobs, embedded use) translate with no path and no commit state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    uri: Option<Uri>,
    commit: Option<CommitFlag>,
}

impl RequestContext {
    /// Context with no HTTP request behind it
    pub fn detached() -> Self {
        Self::default()
    }

    /// Context for an HTTP request with the given target
    pub fn for_uri(uri: Uri) -> Self {
        Self {
            uri: Some(uri),
            commit: None,
        }
    }

    /// Attach the response commit state
    #[must_use]
    pub fn with_commit_flag(mut self, flag: CommitFlag) -> Self {
        self.commit = Some(flag);
        self
    }

    /// Request target, if the context is HTTP-backed
    pub const fn uri(&self) -> Option<&Uri> {
        self.uri.as_ref()
    }

    /// Whether the underlying response is already committed
    ///
    /// A context without a response reports `false`.
    pub fn is_committed(&self) -> bool {
        self.commit.as_ref().is_some_and(CommitFlag::is_committed)
    }

    /// Path reported in error bodies: URI path plus `?query` when a query is present
    pub fn path(&self) -> Option<String> {
        let uri = self.uri.as_ref()?;
        let mut path = uri.path().to_owned();

        if let Some(query) = uri.query().filter(|query| !query.is_empty()) {
            path.push('?');
            path.push_str(query);
        }

        Some(path)
    }
}
