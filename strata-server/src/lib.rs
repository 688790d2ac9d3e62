//! # strata-server
//!
//! HTTP API for the Strata sharded block store.
//!
//! Every request names a workspace; the workspace is routed to its shard
//! database through the [`strata_shard`] registry and served from that
//! shard's PgBouncer-backed connection pool.

pub mod api;
pub mod error;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
