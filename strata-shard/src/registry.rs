//! Lazy per-shard pool registry.
//!
//! The registry is the only shared mutable state in the crate: a slot table
//! with one entry per shard, populated on first access and append-only for
//! the process lifetime. Lookups on a populated slot take a read lock and
//! never block each other; creation takes that slot's write lock, so
//! concurrent first-access requests for one shard converge on a single pool
//! while unrelated shards are never serialized against each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::ShardConfig;
use crate::endpoint::select_endpoint;
use crate::error::{ShardError, ShardResult};
use crate::pool::ShardPool;
use crate::resolver::{resolve, shard_database_name};
use crate::workspace::WorkspaceId;

/// The outcome of routing a workspace to its shard.
#[derive(Clone, Debug)]
pub struct ShardRoute {
    /// Pool serving the shard. Shared; the registry keeps ownership.
    pub pool: Arc<ShardPool>,
    /// Resolved shard index.
    pub shard_index: usize,
    /// Logical database name (`shard{N}`).
    pub database: String,
}

/// Process-lifetime cache of one connection pool per shard.
pub struct ShardRegistry {
    config: ShardConfig,
    slots: Vec<RwLock<Option<Arc<ShardPool>>>>,
    pools_announced: AtomicBool,
}

impl ShardRegistry {
    /// Create an empty registry. Pools are created lazily by
    /// [`route`](Self::route).
    pub fn new(config: ShardConfig) -> Self {
        let slots = (0..config.shard_count).map(|_| RwLock::new(None)).collect();
        Self {
            config,
            slots,
            pools_announced: AtomicBool::new(false),
        }
    }

    /// Get the registry configuration.
    pub fn config(&self) -> &ShardConfig {
        &self.config
    }

    /// Route a workspace to its shard, creating the shard's pool on first
    /// access.
    ///
    /// # Errors
    ///
    /// - [`ShardError::InvalidWorkspaceId`] / [`ShardError::InvalidConfiguration`]
    ///   from the resolver, propagated unchanged.
    /// - [`ShardError::PoolUnavailable`] when no pool can be produced for a
    ///   resolved shard. This signals an internal inconsistency, not a
    ///   transient condition, and is not retried here.
    pub fn route(&self, workspace_id: &WorkspaceId) -> ShardResult<ShardRoute> {
        let shard_index = resolve(workspace_id, self.config.shard_count)?;
        let database = shard_database_name(shard_index);

        let slot = self.slots.get(shard_index).ok_or_else(|| {
            ShardError::pool_unavailable(format!("no registry slot for {database}"))
        })?;

        // Fast path: the pool already exists, a read lock suffices.
        if let Some(pool) = slot.read().as_ref() {
            debug!(
                workspace = %workspace_id,
                shard = shard_index,
                database = %database,
                "routing to existing shard pool"
            );
            return Ok(ShardRoute {
                pool: Arc::clone(pool),
                shard_index,
                database,
            });
        }

        let pool = self.init_slot(slot, shard_index, &database)?;
        debug!(
            workspace = %workspace_id,
            shard = shard_index,
            database = %database,
            "routing to newly created shard pool"
        );
        Ok(ShardRoute {
            pool,
            shard_index,
            database,
        })
    }

    /// Number of pools created so far.
    pub fn pool_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.read().is_some()).count()
    }

    /// Create the pool for one shard under that shard's write lock.
    fn init_slot(
        &self,
        slot: &RwLock<Option<Arc<ShardPool>>>,
        shard_index: usize,
        database: &str,
    ) -> ShardResult<Arc<ShardPool>> {
        let mut slot = slot.write();
        if let Some(pool) = slot.as_ref() {
            // Another caller won the race while we waited for the lock.
            return Ok(Arc::clone(pool));
        }

        if self
            .pools_announced
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!(
                shards = self.config.shard_count,
                proxies = self.config.endpoints.len(),
                "lazily initializing shard connection pools"
            );
        }

        let endpoint = select_endpoint(shard_index, &self.config.endpoints)?;
        let pool = Arc::new(ShardPool::new(database, endpoint, &self.config)?);
        info!(database = %database, endpoint = %endpoint, "shard pool created");

        *slot = Some(Arc::clone(&pool));
        Ok(pool)
    }
}
