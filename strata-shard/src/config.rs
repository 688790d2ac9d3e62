//! Shard routing configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::endpoint::ProxyEndpoint;
use crate::error::{ShardError, ShardResult};

/// Logical shard count provisioned by the default deployment.
pub const DEFAULT_SHARD_COUNT: usize = 3;
/// Default PgBouncer listen port.
pub const DEFAULT_PROXY_PORT: u16 = 6432;
/// Default bound on concurrent connections per shard pool.
pub const DEFAULT_MAX_CONNECTIONS: usize = 15;
/// Default idle time before a pooled connection is recycled.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for establishing a connection through a proxy.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// PgBouncer hosts provisioned by the default deployment.
const DEFAULT_PROXY_HOSTS: [&str; 2] = ["pgbouncer1", "pgbouncer2"];

/// Source for configuration environment variables.
pub trait EnvSource {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Environment source backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a map, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Configuration for shard routing and per-shard pools.
#[derive(Debug, Clone)]
pub struct ShardConfig {
    /// Number of logical shard databases, fixed at startup.
    pub shard_count: usize,
    /// Ordered list of pooling-proxy endpoints.
    pub endpoints: Vec<ProxyEndpoint>,
    /// Username for connecting through the proxies.
    pub user: String,
    /// Password for connecting through the proxies.
    pub password: String,
    /// Maximum concurrent connections per shard pool.
    pub max_connections: usize,
    /// Idle time before a pooled connection is recycled.
    pub idle_timeout: Duration,
    /// Timeout for establishing or waiting for a connection.
    pub connect_timeout: Duration,
    /// Application name reported to the server (shown in pg_stat_activity).
    pub application_name: Option<String>,
}

impl ShardConfig {
    /// Create a builder for configuration.
    pub fn builder() -> ShardConfigBuilder {
        ShardConfigBuilder::new()
    }

    /// Load configuration from the process environment.
    ///
    /// | variable | default |
    /// |---|---|
    /// | `SHARD_COUNT` | 3 |
    /// | `PGBOUNCER_HOSTS` (comma-separated) | `pgbouncer1,pgbouncer2` |
    /// | `PGBOUNCER_PORT` | 6432 |
    /// | `PGBOUNCER_USER` | required |
    /// | `PGBOUNCER_PASSWORD` | required |
    /// | `SHARD_POOL_MAX` | 15 |
    ///
    /// Missing credentials fail startup; there is no default credential pair.
    pub fn from_env() -> ShardResult<Self> {
        Self::from_env_source(&StdEnvSource)
    }

    /// Load configuration from an explicit environment source.
    pub fn from_env_source(env: &dyn EnvSource) -> ShardResult<Self> {
        let shard_count = parse_var(env, "SHARD_COUNT", DEFAULT_SHARD_COUNT)?;
        let port = parse_var(env, "PGBOUNCER_PORT", DEFAULT_PROXY_PORT)?;
        let max_connections = parse_var(env, "SHARD_POOL_MAX", DEFAULT_MAX_CONNECTIONS)?;

        let endpoints = match env.get("PGBOUNCER_HOSTS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|host| !host.is_empty())
                .map(|host| ProxyEndpoint::new(host, port))
                .collect(),
            None => DEFAULT_PROXY_HOSTS
                .iter()
                .map(|host| ProxyEndpoint::new(*host, port))
                .collect(),
        };

        let user = env
            .get("PGBOUNCER_USER")
            .filter(|user| !user.is_empty())
            .ok_or_else(|| ShardError::config("PGBOUNCER_USER is not set"))?;
        let password = env
            .get("PGBOUNCER_PASSWORD")
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ShardError::config("PGBOUNCER_PASSWORD is not set"))?;

        let config = Self {
            shard_count,
            endpoints,
            user,
            password,
            max_connections,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            application_name: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the startup invariants.
    pub fn validate(&self) -> ShardResult<()> {
        if self.shard_count == 0 {
            return Err(ShardError::config("shard count must be a positive integer"));
        }
        if self.endpoints.is_empty() {
            return Err(ShardError::config("proxy endpoint list must not be empty"));
        }
        if self.endpoints.iter().any(|endpoint| endpoint.host.is_empty()) {
            return Err(ShardError::config("proxy endpoint host must not be empty"));
        }
        if self.user.is_empty() || self.password.is_empty() {
            return Err(ShardError::config("proxy credentials must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(ShardError::config("max connections must be a positive integer"));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(env: &dyn EnvSource, name: &str, default: T) -> ShardResult<T> {
    match env.get(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ShardError::config(format!("invalid {name}: {raw}"))),
        None => Ok(default),
    }
}

/// Builder for shard routing configuration.
#[derive(Debug, Default)]
pub struct ShardConfigBuilder {
    shard_count: Option<usize>,
    endpoints: Vec<ProxyEndpoint>,
    user: Option<String>,
    password: Option<String>,
    max_connections: Option<usize>,
    idle_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    application_name: Option<String>,
}

impl ShardConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shard count.
    pub fn shard_count(mut self, count: usize) -> Self {
        self.shard_count = Some(count);
        self
    }

    /// Add a proxy endpoint.
    pub fn endpoint(mut self, endpoint: ProxyEndpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Set the full proxy endpoint list.
    pub fn endpoints(mut self, endpoints: Vec<ProxyEndpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the proxy username.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the proxy password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the maximum connections per shard pool.
    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = Some(n);
        self
    }

    /// Set the idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ShardResult<ShardConfig> {
        let endpoints = if self.endpoints.is_empty() {
            DEFAULT_PROXY_HOSTS
                .iter()
                .map(|host| ProxyEndpoint::new(*host, DEFAULT_PROXY_PORT))
                .collect()
        } else {
            self.endpoints
        };

        let config = ShardConfig {
            shard_count: self.shard_count.unwrap_or(DEFAULT_SHARD_COUNT),
            endpoints,
            user: self
                .user
                .ok_or_else(|| ShardError::config("proxy username is required"))?,
            password: self
                .password
                .ok_or_else(|| ShardError::config("proxy password is required"))?,
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            idle_timeout: self.idle_timeout.unwrap_or(DEFAULT_IDLE_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            application_name: self.application_name,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> MapEnvSource {
        MapEnvSource::new()
            .set("PGBOUNCER_USER", "app")
            .set("PGBOUNCER_PASSWORD", "secret")
    }

    #[test]
    fn test_from_env_defaults() {
        let config = ShardConfig::from_env_source(&env()).unwrap();

        assert_eq!(config.shard_count, 3);
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0], ProxyEndpoint::new("pgbouncer1", 6432));
        assert_eq!(config.endpoints[1], ProxyEndpoint::new("pgbouncer2", 6432));
        assert_eq!(config.max_connections, 15);
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_env_overrides() {
        let env = env()
            .set("SHARD_COUNT", "8")
            .set("PGBOUNCER_HOSTS", "proxy-a, proxy-b ,proxy-c")
            .set("PGBOUNCER_PORT", "7000")
            .set("SHARD_POOL_MAX", "25");
        let config = ShardConfig::from_env_source(&env).unwrap();

        assert_eq!(config.shard_count, 8);
        assert_eq!(
            config.endpoints,
            vec![
                ProxyEndpoint::new("proxy-a", 7000),
                ProxyEndpoint::new("proxy-b", 7000),
                ProxyEndpoint::new("proxy-c", 7000),
            ]
        );
        assert_eq!(config.max_connections, 25);
    }

    #[test]
    fn test_from_env_requires_credentials() {
        let err = ShardConfig::from_env_source(&MapEnvSource::new()).unwrap_err();
        assert!(matches!(err, ShardError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("PGBOUNCER_USER"));

        let env = MapEnvSource::new().set("PGBOUNCER_USER", "app");
        let err = ShardConfig::from_env_source(&env).unwrap_err();
        assert!(err.to_string().contains("PGBOUNCER_PASSWORD"));
    }

    #[test]
    fn test_from_env_rejects_invalid_values() {
        let err = ShardConfig::from_env_source(&env().set("SHARD_COUNT", "three")).unwrap_err();
        assert!(matches!(err, ShardError::InvalidConfiguration(_)));

        let err = ShardConfig::from_env_source(&env().set("SHARD_COUNT", "0")).unwrap_err();
        assert!(matches!(err, ShardError::InvalidConfiguration(_)));

        let err = ShardConfig::from_env_source(&env().set("SHARD_COUNT", "-1")).unwrap_err();
        assert!(matches!(err, ShardError::InvalidConfiguration(_)));

        let err = ShardConfig::from_env_source(&env().set("PGBOUNCER_HOSTS", " , ")).unwrap_err();
        assert!(matches!(err, ShardError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_builder() {
        let config = ShardConfig::builder()
            .shard_count(4)
            .endpoint(ProxyEndpoint::new("proxy", 6432))
            .user("app")
            .password("secret")
            .max_connections(20)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.shard_count, 4);
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_requires_credentials() {
        let err = ShardConfig::builder().build().unwrap_err();
        assert!(matches!(err, ShardError::InvalidConfiguration(_)));
    }
}
