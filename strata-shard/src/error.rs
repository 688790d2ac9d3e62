//! Error types for shard routing and pool management.

use thiserror::Error;

/// Result type for shard routing operations.
pub type ShardResult<T> = Result<T, ShardError>;

/// Errors that can occur while routing a workspace to its shard pool.
#[derive(Error, Debug)]
pub enum ShardError {
    /// Workspace identifier cannot be mapped to a shard.
    #[error("invalid workspace id for sharding: {0}")]
    InvalidWorkspaceId(String),

    /// Shard count, endpoint list, or credentials violate a startup invariant.
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),

    /// No pool handle could be produced for a shard.
    #[error("pool unavailable: {0}")]
    PoolUnavailable(String),

    /// Connection pool error.
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

impl ShardError {
    /// Create an invalid-workspace-id error.
    pub fn invalid_workspace_id(id: impl Into<String>) -> Self {
        Self::InvalidWorkspaceId(id.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a pool-unavailable error.
    pub fn pool_unavailable(message: impl Into<String>) -> Self {
        Self::PoolUnavailable(message.into())
    }

    /// Check if this error was caused by the caller's input.
    ///
    /// The boundary layer maps client errors to a bad-request outcome and
    /// everything else to a server-side failure, without inspecting messages.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidWorkspaceId(_))
    }

    /// Check if this is a borrow-time timeout the caller may retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Pool(deadpool_postgres::PoolError::Timeout(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ShardError::invalid_workspace_id("bogus");
        assert!(matches!(err, ShardError::InvalidWorkspaceId(_)));
        assert!(err.is_client_error());

        let err = ShardError::config("shard count must be a positive integer");
        assert!(matches!(err, ShardError::InvalidConfiguration(_)));
        assert!(!err.is_client_error());

        let err = ShardError::pool_unavailable("no slot for shard9");
        assert!(matches!(err, ShardError::PoolUnavailable(_)));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_error_display() {
        let err = ShardError::invalid_workspace_id("short");
        assert_eq!(err.to_string(), "invalid workspace id for sharding: short");

        let err = ShardError::config("empty endpoint list");
        assert_eq!(err.to_string(), "configuration error: empty endpoint list");
    }
}
