//! # strata-shard
//!
//! Deterministic workspace-to-shard routing with lazy, per-shard connection
//! pools reached through PgBouncer proxies.
//!
//! This crate provides:
//! - A pure resolver mapping workspace identifiers to shard indices
//! - Proxy endpoint selection, intentionally decoupled from the shard count
//! - A process-lifetime registry holding exactly one pool per shard, created
//!   lazily and safely under concurrent first access
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_shard::prelude::*;
//!
//! let config = ShardConfig::from_env()?;
//! let registry = ShardRegistry::new(config);
//!
//! // Deterministic: the same workspace always lands on the same shard.
//! let route = registry.route(&WorkspaceId::new("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"))?;
//! let conn = route.pool.get().await?;
//! let rows = conn.query("SELECT * FROM blocks WHERE workspace_id = $1", &[&"..."]).await?;
//! ```

pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod pool;
pub mod registry;
pub mod resolver;
pub mod workspace;

pub use config::{EnvSource, MapEnvSource, ShardConfig, ShardConfigBuilder, StdEnvSource};
pub use connection::ShardConnection;
pub use endpoint::{ProxyEndpoint, select_endpoint};
pub use error::{ShardError, ShardResult};
pub use pool::{PoolStatus, ShardPool};
pub use registry::{ShardRegistry, ShardRoute};
pub use resolver::{resolve, shard_database_name};
pub use workspace::WorkspaceId;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::ShardConfig;
    pub use crate::connection::ShardConnection;
    pub use crate::endpoint::ProxyEndpoint;
    pub use crate::error::{ShardError, ShardResult};
    pub use crate::pool::ShardPool;
    pub use crate::registry::{ShardRegistry, ShardRoute};
    pub use crate::resolver::{resolve, shard_database_name};
    pub use crate::workspace::WorkspaceId;
}
