use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use utils::assets::default_database_url;

use crate::DeploymentError;

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 3001;

/// Runtime settings read from `DATABASE_URL`, `HOST` and `PORT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
}

impl DeploymentConfig {
    pub fn from_env() -> Result<Self, DeploymentError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`; unset or blank values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DeploymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match get("HOST") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| DeploymentError::Config(format!("HOST is not an IP address: {raw}")))?,
            None => DEFAULT_HOST,
        };
        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| DeploymentError::Config(format!("PORT is not a valid port: {raw}")))?,
            None => DEFAULT_PORT,
        };
        let database_url = get("DATABASE_URL").unwrap_or_else(default_database_url);

        Ok(Self {
            database_url,
            host,
            port,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
