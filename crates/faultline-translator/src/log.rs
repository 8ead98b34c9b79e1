use std::error::Error as StdError;
use std::sync::{Mutex, PoisonError};

/// Logging capability injected into the translator
///
/// Every translation rule logs at warning severity. The translator asks
/// [`warn_enabled`](Self::warn_enabled) first so nothing is formatted when the
/// level is off.
pub trait FailureLog: Send + Sync {
    fn warn_enabled(&self) -> bool;

    /// Emit a warning, optionally carrying the error object
    fn warn(&self, message: &str, error: Option<&(dyn StdError + 'static)>);
}

/// Routes translator warnings into `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl FailureLog for TracingLog {
    fn warn_enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::WARN)
    }

    fn warn(&self, message: &str, error: Option<&(dyn StdError + 'static)>) {
        match error {
            Some(error) => tracing::warn!(error, "{message}"),
            None => tracing::warn!("{message}"),
        }
    }
}

/// One warning recorded by [`CapturingLog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub message: String,
    /// Display form of the attached error, if one was logged
    pub error: Option<String>,
}

/// In-memory log for tests
#[derive(Debug)]
pub struct CapturingLog {
    enabled: bool,
    records: Mutex<Vec<LogRecord>>,
}

impl CapturingLog {
    pub fn new() -> Self {
        Self {
            enabled: true,
            records: Mutex::new(Vec::new()),
        }
    }

    /// A log whose warning level is switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for CapturingLog {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureLog for CapturingLog {
    fn warn_enabled(&self) -> bool {
        self.enabled
    }

    fn warn(&self, message: &str, error: Option<&(dyn StdError + 'static)>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                message: message.to_owned(),
                error: error.map(ToString::to_string),
            });
    }
}
