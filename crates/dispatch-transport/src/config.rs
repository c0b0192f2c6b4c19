//! Transport configuration (§4.6, §6).

use serde::{Deserialize, Serialize};

/// Bind addresses, ports, and asset-bootstrap configuration for one
/// transport instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Address the worker WebSocket listener binds to.
    pub bind_addr: String,
    /// Port for the worker-facing `/ws` endpoint.
    pub transport_port: u16,
    /// Port for the asset/package bootstrap endpoint.
    pub asset_port: u16,
    /// Package names reported by `GET /packages`.
    pub packages: Vec<String>,
    /// Local directory served at `GET /*` for worker bootstrap assets.
    pub assets_dir: std::path::PathBuf,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            transport_port: 7700,
            asset_port: 7701,
            packages: Vec::new(),
            assets_dir: std::path::PathBuf::from("assets"),
        }
    }
}

impl TransportConfig {
    /// `host:port` for the worker WebSocket listener.
    #[must_use]
    pub fn transport_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.transport_port)
    }

    /// `host:port` for the asset/package bootstrap listener.
    #[must_use]
    pub fn asset_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.asset_port)
    }
}
