//! Borrowed shard connections.

use deadpool_postgres::Object;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::debug;

use crate::error::ShardResult;

/// A connection borrowed from a [`ShardPool`](crate::pool::ShardPool) for one
/// unit of work.
///
/// The connection returns to its pool when this wrapper drops, on every exit
/// path: success, business-logic failure, or unexpected fault.
pub struct ShardConnection {
    client: Object,
}

impl ShardConnection {
    pub(crate) fn new(client: Object) -> Self {
        Self { client }
    }

    /// Execute a query and return all rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> ShardResult<Vec<Row>> {
        debug!(sql = %sql, "executing query");
        let rows = self.client.query(sql, params).await?;
        Ok(rows)
    }

    /// Execute a query and return exactly one row.
    pub async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> ShardResult<Row> {
        debug!(sql = %sql, "executing query_one");
        let row = self.client.query_one(sql, params).await?;
        Ok(row)
    }

    /// Execute a query and return zero or one row.
    pub async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> ShardResult<Option<Row>> {
        debug!(sql = %sql, "executing query_opt");
        let row = self.client.query_opt(sql, params).await?;
        Ok(row)
    }

    /// Execute a statement and return the number of affected rows.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> ShardResult<u64> {
        debug!(sql = %sql, "executing statement");
        let count = self.client.execute(sql, params).await?;
        Ok(count)
    }

    /// Get the underlying pooled client.
    ///
    /// This is useful for advanced operations not covered by this wrapper.
    pub fn inner(&self) -> &Object {
        &self.client
    }
}
