//! Distributed backend options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single server in the distributed pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerEndpoint {
    /// Hostname or address
    pub host: String,

    /// TCP port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerEndpoint {
    /// Create a new endpoint
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ServerEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|e| format!("invalid port in '{}': {}", s, e))?;
                if host.is_empty() {
                    return Err(format!("missing host in '{}'", s));
                }
                Ok(Self::new(host, port))
            }
            None if !s.is_empty() => Ok(Self::new(s, default_port())),
            None => Err("empty server endpoint".to_string()),
        }
    }
}

/// Distributed key-value pool options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributedOptions {
    /// Servers registered when the pool is first connected
    pub servers: Vec<ServerEndpoint>,

    /// Named pool shared by every driver in the process that uses the same name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,

    /// Compress payloads on the wire
    #[serde(default = "crate::domains::utils::default_false")]
    pub compress: bool,
}

fn default_port() -> u16 {
    6379
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        let endpoint: ServerEndpoint = "cache1:7000".parse().unwrap();
        assert_eq!(endpoint, ServerEndpoint::new("cache1", 7000));
        assert_eq!(endpoint.to_string(), "cache1:7000");

        let endpoint: ServerEndpoint = "cache2".parse().unwrap();
        assert_eq!(endpoint.port, 6379);

        assert!(":7000".parse::<ServerEndpoint>().is_err());
        assert!("cache1:http".parse::<ServerEndpoint>().is_err());
        assert!("".parse::<ServerEndpoint>().is_err());
    }
}
