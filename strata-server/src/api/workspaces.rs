//! Workspace generation and shard distribution reporting.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use strata_shard::resolver::{resolve, shard_database_name};
use strata_shard::workspace::WorkspaceId;

use crate::error::ApiResult;
use crate::state::AppState;

/// Query parameters for `GET /api/generate-workspaces`.
#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    pub count: Option<usize>,
}

/// A freshly generated workspace and its resolved shard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWorkspace {
    pub workspace_id: Uuid,
    pub shard_index: usize,
}

/// Response for `GET /api/generate-workspaces`.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub workspaces: Vec<GeneratedWorkspace>,
    /// Workspaces per logical database name, over the generated set.
    pub distribution: BTreeMap<String, usize>,
}

/// `GET /api/generate-workspaces`
///
/// Generates random workspace ids and reports how the resolver spreads them
/// across shards. Purely computational; no database access.
pub async fn generate(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
) -> ApiResult<Json<GenerateResponse>> {
    let count = params.count.unwrap_or(10);
    let shard_count = state.registry.config().shard_count;
    debug!(count, shard_count, "generating workspaces");

    let mut workspaces = Vec::with_capacity(count);
    for _ in 0..count {
        let id = Uuid::new_v4();
        let shard_index = resolve(&WorkspaceId::from(id), shard_count)?;
        workspaces.push(GeneratedWorkspace {
            workspace_id: id,
            shard_index,
        });
    }

    let mut distribution = BTreeMap::new();
    for index in 0..shard_count {
        let members = workspaces.iter().filter(|w| w.shard_index == index).count();
        distribution.insert(shard_database_name(index), members);
    }

    Ok(Json(GenerateResponse {
        workspaces,
        distribution,
    }))
}
