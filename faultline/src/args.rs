use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Faultline reference host
#[derive(Debug, Parser)]
#[command(name = "faultline", about = "Serves probe routes through the Faultline error translator")]
pub struct Args {
    /// Path to configuration file; built-in defaults apply when omitted
    #[arg(short, long, env = "FAULTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "FAULTLINE_LISTEN")]
    pub listen: Option<SocketAddr>,
}
