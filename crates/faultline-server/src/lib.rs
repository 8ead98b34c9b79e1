//! axum integration for Faultline
//!
//! [`with_error_translation`] installs the translation middleware on any
//! router. [`Server`] is the reference host serving health and probe routes.

mod probe;
mod translate;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use faultline_config::Config;
use faultline_translator::ErrorTranslator;
use tower_http::trace::TraceLayer;

pub use translate::{HandlerPanicked, render, translate_errors, with_error_translation};

/// Liveness check, independent of error translation
async fn health() -> &'static str {
    "ok"
}

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let mut app = Router::new().route("/health", axum::routing::get(health));

        if config.server.probes {
            app = app.merge(probe::router());
        }

        // Registration toggle: without it errors fall through to the bare 500
        if config.errors.enabled {
            let translator = Arc::new(ErrorTranslator::from_config(&config.errors));
            tracing::debug!(?translator, "error translation enabled");
            app = with_error_translation(app, translator);
        } else {
            tracing::warn!("error translation disabled, failures will be returned as bare statuses");
        }

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
