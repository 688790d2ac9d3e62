//! HTTP API surface.

pub mod blocks;
pub mod workspaces;

use axum::Router;
use axum::routing::{get, post, put};
use serde::Serialize;
use serde_json::Value;

use strata_shard::registry::ShardRoute;

use crate::state::AppState;

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/blocks", post(blocks::create))
        .route("/api/blocks/{id}", put(blocks::update))
        .route("/api/workspaces/{workspace_id}/blocks", get(blocks::list))
        .route("/api/generate-workspaces", get(workspaces::generate))
        .with_state(state)
}

/// Shard routing report attached to block responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingReport {
    pub workspace_id: String,
    pub shard_index: usize,
    pub pg_bouncer_host: String,
    pub logical_database: String,
    pub shard_info: Option<Value>,
}

impl RoutingReport {
    /// Describe how a request was routed.
    pub fn new(route: &ShardRoute, workspace_id: impl Into<String>, shard_info: Option<Value>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            shard_index: route.shard_index,
            pg_bouncer_host: route.pool.endpoint().host.clone(),
            logical_database: route.database.clone(),
            shard_info,
        }
    }
}
