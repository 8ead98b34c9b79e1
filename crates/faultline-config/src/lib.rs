#![allow(clippy::must_use_candidate)]

mod env;
pub mod errors;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use errors::*;
pub use server::*;
pub use telemetry::*;

/// Top-level Faultline configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Host server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Error translation configuration
    #[serde(default)]
    pub errors: ErrorHandlingConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
