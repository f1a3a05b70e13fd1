use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_UPSTREAM_URL: &str = "https://growagarden.gg/stocks?_rsc=14g5d";
pub const DEFAULT_PAYLOAD_KEY: &str = "stockDataSSR";

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    pub public_dir: PathBuf,

    pub upstream_url: String,
    pub payload_key: String,
    pub snapshot_path: PathBuf,

    /// Destination and sender address for every notification.
    pub email: String,

    pub interval_seconds: u64,
}
