//! Per-shard connection pools over PgBouncer.

use deadpool_postgres::{Hook, Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::{debug, warn};

use crate::config::ShardConfig;
use crate::connection::ShardConnection;
use crate::endpoint::ProxyEndpoint;
use crate::error::{ShardError, ShardResult};

/// A bounded connection pool for one logical shard database, reached through
/// one pooling-proxy endpoint.
///
/// Pools are owned exclusively by the [`ShardRegistry`](crate::registry::ShardRegistry);
/// handlers borrow connections with [`get`](Self::get) but never own the pool.
/// Construction only configures the pool, no connections are opened eagerly.
#[derive(Debug)]
pub struct ShardPool {
    inner: Pool,
    database: String,
    endpoint: ProxyEndpoint,
    max_connections: usize,
}

impl ShardPool {
    /// Create a pool for one shard database behind the given proxy endpoint.
    pub(crate) fn new(
        database: impl Into<String>,
        endpoint: &ProxyEndpoint,
        config: &ShardConfig,
    ) -> ShardResult<Self> {
        let database = database.into();

        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&endpoint.host);
        pg_config.port(endpoint.port);
        pg_config.dbname(&database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.connect_timeout(config.connect_timeout);
        if let Some(ref app_name) = config.application_name {
            pg_config.application_name(app_name);
        }

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);

        // A faulted idle connection is observed here, logged, and discarded;
        // it never fails requests that are not using that connection.
        let recycle_database = database.clone();
        let pool = Pool::builder(mgr)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(config.connect_timeout))
            .create_timeout(Some(config.connect_timeout))
            .recycle_timeout(Some(config.idle_timeout))
            .pre_recycle(Hook::sync_fn(move |_client, metrics| {
                debug!(
                    database = %recycle_database,
                    recycle_count = metrics.recycle_count,
                    "recycling pooled connection"
                );
                Ok(())
            }))
            .build()
            .map_err(|e| {
                ShardError::pool_unavailable(format!("failed to create pool for {database}: {e}"))
            })?;

        Ok(Self {
            inner: pool,
            database,
            endpoint: endpoint.clone(),
            max_connections: config.max_connections,
        })
    }

    /// Borrow a connection from the pool.
    ///
    /// The acquisition honors the configured connect timeout; a timeout or
    /// backend fault surfaces as an error the caller may retry, and is logged
    /// here. The connection returns to the pool when the returned wrapper is
    /// dropped.
    pub async fn get(&self) -> ShardResult<ShardConnection> {
        debug!(database = %self.database, "acquiring connection from shard pool");
        match self.inner.get().await {
            Ok(client) => Ok(ShardConnection::new(client)),
            Err(e) => {
                warn!(
                    database = %self.database,
                    endpoint = %self.endpoint,
                    error = %e,
                    "failed to acquire pooled connection"
                );
                Err(e.into())
            }
        }
    }

    /// Get the current pool status.
    pub fn status(&self) -> PoolStatus {
        let status = self.inner.status();
        PoolStatus {
            available: status.available as usize,
            size: status.size as usize,
            max_size: status.max_size as usize,
            waiting: status.waiting,
        }
    }

    /// Target logical database name (`shard{N}`).
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Backing proxy endpoint.
    pub fn endpoint(&self) -> &ProxyEndpoint {
        &self.endpoint
    }

    /// Configured bound on concurrent connections.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// Pool status information.
#[derive(Debug, Clone)]
pub struct PoolStatus {
    /// Number of available (idle) connections.
    pub available: usize,
    /// Current total size of the pool.
    pub size: usize,
    /// Maximum size of the pool.
    pub max_size: usize,
    /// Number of tasks waiting for a connection.
    pub waiting: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ProxyEndpoint;

    fn config() -> ShardConfig {
        ShardConfig::builder()
            .user("test")
            .password("test")
            .max_connections(15)
            .build()
            .unwrap()
    }

    #[test]
    fn test_pool_configures_without_connecting() {
        let endpoint = ProxyEndpoint::new("pgbouncer1", 6432);
        let pool = ShardPool::new("shard0", &endpoint, &config()).unwrap();

        assert_eq!(pool.database(), "shard0");
        assert_eq!(pool.endpoint(), &endpoint);
        assert_eq!(pool.max_connections(), 15);

        let status = pool.status();
        assert_eq!(status.max_size, 15);
        assert_eq!(status.size, 0);
        assert_eq!(status.available, 0);
        assert_eq!(status.waiting, 0);
    }
}
