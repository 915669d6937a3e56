use anyhow::{Context, Result};
use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Process configuration, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
        )
    }

    fn from_vars(port: Option<&str>, log_filter: Option<&str>) -> Result<Self> {
        let port = match port {
            Some(port) => port
                .parse()
                .with_context(|| format!("invalid PORT: {port}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            log_filter: log_filter.unwrap_or(DEFAULT_LOG_FILTER).to_owned(),
        })
    }
}
