//! Mock dependent service that always answers with a canned error

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Router, routing};
use tokio_util::sync::CancellationToken;

/// Upstream service returning `status` with `body` on every request
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockUpstreamState>,
}

struct MockUpstreamState {
    status: StatusCode,
    body: String,
    request_count: AtomicU32,
}

impl MockUpstream {
    pub async fn start(status: StatusCode, body: impl Into<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockUpstreamState {
            status,
            body: body.into(),
            request_count: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/inventory", routing::get(handle))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn url(&self) -> String {
        format!("http://{}/inventory", self.addr)
    }

    /// Number of requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle(State(state): State<Arc<MockUpstreamState>>) -> impl IntoResponse {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    (state.status, state.body.clone())
}
