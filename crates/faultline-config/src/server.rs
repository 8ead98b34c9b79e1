use std::net::SocketAddr;

use serde::Deserialize;

/// Reference host settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Mount the `/probe/*` routes that raise one error of each category
    #[serde(default = "default_probes")]
    pub probes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            probes: true,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_probes() -> bool {
    true
}
