use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::Deserialize;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Socket address to bind the listener on
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

const fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn default_port() -> u16 {
    8787
}
