//! Configuration types for the compatibility layer

use std::fmt;
use std::time::Duration;

/// Deployment shape of the store a facade talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Single standalone server
    Standalone,
    /// Standalone server monitored by sentinels
    Sentinel,
    /// Sharded cluster
    Cluster,
}

impl Topology {
    /// Check if this is the cluster topology
    #[must_use]
    pub const fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster)
    }

    /// Check if this is the sentinel topology
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standalone => "standalone",
            Self::Sentinel => "sentinel",
            Self::Cluster => "cluster",
        })
    }
}

/// Which of the two supported driver back-ends a facade is wired with
///
/// This is a build-time choice: the facade is generic over the driver and the
/// kind is only carried for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverKind {
    /// Flat reply model (simple strings, integers, bulk, arrays)
    #[default]
    Resp2,
    /// Extended reply model (native booleans, doubles, maps, sets)
    Resp3,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resp2 => "resp2",
            Self::Resp3 => "resp3",
        })
    }
}

/// Configuration handed to a client facade
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Connection string (e.g. `redis://localhost:6379` or `redis://host1:6379,host2:6379`)
    pub connection_string: String,

    /// Optional password for authentication
    pub password: Option<String>,

    /// Database number (ignored under the cluster topology)
    pub database: u8,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Read/write operation timeout
    pub operation_timeout: Duration,

    /// Preferred driver back-end
    pub driver: DriverKind,

    /// Sentinel settings, required for the sentinel topology
    pub sentinel: Option<SentinelConfig>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            connection_string: "redis://localhost:6379".to_string(),
            password: None,
            database: 0,
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(30),
            driver: DriverKind::default(),
            sentinel: None,
        }
    }
}

impl BridgeConfig {
    /// Create a new configuration with the given connection string
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Default::default()
        }
    }

    /// Set the password for authentication
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database number
    #[must_use]
    pub const fn with_database(mut self, database: u8) -> Self {
        self.database = database;
        self
    }

    /// Set the connection timeout
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the operation timeout
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set the preferred driver back-end
    #[must_use]
    pub const fn with_driver(mut self, driver: DriverKind) -> Self {
        self.driver = driver;
        self
    }

    /// Set the sentinel configuration
    #[must_use]
    pub fn with_sentinel(mut self, sentinel: SentinelConfig) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// Parse connection endpoints from the connection string
    #[must_use]
    pub fn parse_endpoints(&self) -> Vec<(String, u16)> {
        let conn_str = self.connection_string.trim();
        let addr_part = conn_str
            .strip_prefix("redis://")
            .or_else(|| conn_str.strip_prefix("rediss://"))
            .unwrap_or(conn_str);

        addr_part
            .split(',')
            .filter_map(|endpoint| {
                let endpoint = endpoint.trim();
                if endpoint.is_empty() {
                    return None;
                }
                if let Some((host, port_str)) = endpoint.rsplit_once(':') {
                    if let Ok(port) = port_str.parse::<u16>() {
                        return Some((host.to_string(), port));
                    }
                }
                // Default port if none was given
                Some((endpoint.to_string(), 6379))
            })
            .collect()
    }
}

/// Settings for the sentinel-monitored topology
///
/// Master resolution itself is the connection layer's concern; this type only
/// carries what that layer needs.
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    /// Name of the monitored master
    pub master_name: String,
    /// Sentinel endpoints as `host:port`
    pub sentinels: Vec<String>,
    /// Password for the sentinel nodes themselves
    pub sentinel_password: Option<String>,
}

impl SentinelConfig {
    /// Create a sentinel configuration for the given master name
    pub fn new(master_name: impl Into<String>) -> Self {
        Self {
            master_name: master_name.into(),
            sentinels: Vec::new(),
            sentinel_password: None,
        }
    }

    /// Add one sentinel endpoint
    #[must_use]
    pub fn add_sentinel(mut self, endpoint: impl Into<String>) -> Self {
        self.sentinels.push(endpoint.into());
        self
    }

    /// Set the password used to talk to the sentinels
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.sentinel_password = Some(password.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_endpoint_with_scheme() {
        let config = BridgeConfig::new("redis://localhost:6380");
        assert_eq!(config.parse_endpoints(), vec![("localhost".to_string(), 6380)]);
    }

    #[test]
    fn parses_multiple_endpoints_and_default_port() {
        let config = BridgeConfig::new("redis://host1:7000, host2:7001,host3");
        assert_eq!(
            config.parse_endpoints(),
            vec![
                ("host1".to_string(), 7000),
                ("host2".to_string(), 7001),
                ("host3".to_string(), 6379),
            ]
        );
    }

    #[test]
    fn builder_methods_compose() {
        let config = BridgeConfig::new("redis://localhost:6379")
            .with_password("secret")
            .with_database(3)
            .with_driver(DriverKind::Resp3)
            .with_sentinel(
                SentinelConfig::new("mymaster")
                    .add_sentinel("127.0.0.1:26379")
                    .add_sentinel("127.0.0.1:26380"),
            );
        assert_eq!(config.database, 3);
        assert_eq!(config.driver, DriverKind::Resp3);
        assert_eq!(config.sentinel.unwrap().sentinels.len(), 2);
    }

    #[test]
    fn topology_display_is_lowercase() {
        assert_eq!(Topology::Standalone.to_string(), "standalone");
        assert_eq!(Topology::Sentinel.to_string(), "sentinel");
        assert_eq!(Topology::Cluster.to_string(), "cluster");
    }
}
