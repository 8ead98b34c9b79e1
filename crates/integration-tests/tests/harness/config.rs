//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use faultline_config::{Config, ErrorHandlingConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with probes mounted and translation enabled
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    probes: true,
                },
                errors: ErrorHandlingConfig::default(),
                ..Config::default()
            },
        }
    }

    /// Skip installing the translation middleware
    pub fn without_translation(mut self) -> Self {
        self.config.errors.enabled = false;
        self
    }

    /// Build without the security capability
    pub fn without_access_denied(mut self) -> Self {
        self.config.errors.access_denied = false;
        self
    }

    /// Override the upstream echo and frame limits
    pub fn with_upstream_limits(mut self, body: usize, frames: usize) -> Self {
        self.config.errors.upstream_body_limit = body;
        self.config.errors.upstream_trace_limit = frames;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
