//! Block handlers.
//!
//! Every handler routes by workspace id first, then performs its unit of
//! work on one borrowed connection. The connection returns to the pool when
//! the handler exits, on success and failure alike.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio_postgres::Row;
use tracing::debug;
use uuid::Uuid;

use strata_shard::connection::ShardConnection;
use strata_shard::workspace::WorkspaceId;

use super::RoutingReport;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A stored block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: Uuid,
    pub workspace_id: String,
    pub parent_block_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Block {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            workspace_id: row.try_get("workspace_id")?,
            parent_block_id: row.try_get("parent_block_id")?,
            kind: row.try_get("type")?,
            properties: row.try_get("properties")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Request body for `POST /api/blocks`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlockRequest {
    pub workspace_id: String,
    pub parent_block_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub properties: Option<Value>,
}

/// Request body for `PUT /api/blocks/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlockRequest {
    pub workspace_id: String,
    pub properties: Value,
}

/// Response carrying one block plus its routing report.
#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub block: Block,
    pub routing: RoutingReport,
}

/// Response carrying a workspace's blocks plus the routing report.
#[derive(Debug, Serialize)]
pub struct BlockListResponse {
    pub blocks: Vec<Block>,
    pub routing: RoutingReport,
}

/// `POST /api/blocks`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateBlockRequest>,
) -> ApiResult<(StatusCode, Json<BlockResponse>)> {
    let workspace_id = WorkspaceId::new(&req.workspace_id);
    let route = state.registry.route(&workspace_id)?;

    let block_id = Uuid::new_v4();
    let kind = req.kind.unwrap_or_else(|| "text".to_string());
    let properties = req.properties.unwrap_or_else(|| json!({}));

    let conn = route.pool.get().await?;
    let row = conn
        .query_one(
            "INSERT INTO blocks (id, workspace_id, parent_block_id, type, properties) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
            &[
                &block_id,
                &req.workspace_id,
                &req.parent_block_id,
                &kind,
                &properties,
            ],
        )
        .await?;

    let block = Block::from_row(&row)?;
    let shard_info = fetch_shard_info(&conn).await?;
    debug!(
        workspace = %workspace_id,
        block = %block.id,
        database = %route.database,
        "block created"
    );

    Ok((
        StatusCode::CREATED,
        Json(BlockResponse {
            block,
            routing: RoutingReport::new(&route, req.workspace_id, shard_info),
        }),
    ))
}

/// `PUT /api/blocks/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBlockRequest>,
) -> ApiResult<Json<BlockResponse>> {
    let workspace_id = WorkspaceId::new(&req.workspace_id);
    let route = state.registry.route(&workspace_id)?;

    let conn = route.pool.get().await?;
    let row = conn
        .query_opt(
            "UPDATE blocks \
             SET properties = $1, updated_at = NOW() \
             WHERE id = $2 AND workspace_id = $3 \
             RETURNING *",
            &[&req.properties, &id, &req.workspace_id],
        )
        .await?;

    let Some(row) = row else {
        // Distinguish a missing block from one owned by another workspace.
        let exists = conn
            .query_opt("SELECT id FROM blocks WHERE id = $1", &[&id])
            .await?;
        return Err(if exists.is_some() {
            ApiError::WorkspaceMismatch {
                id,
                workspace_id: req.workspace_id,
                shard_index: route.shard_index,
            }
        } else {
            ApiError::BlockNotFound {
                id,
                shard_index: route.shard_index,
            }
        });
    };

    let block = Block::from_row(&row)?;
    let shard_info = fetch_shard_info(&conn).await?;

    Ok(Json(BlockResponse {
        block,
        routing: RoutingReport::new(&route, req.workspace_id, shard_info),
    }))
}

/// `GET /api/workspaces/{workspace_id}/blocks`
pub async fn list(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<BlockListResponse>> {
    let route = state.registry.route(&WorkspaceId::new(&workspace_id))?;

    let conn = route.pool.get().await?;
    let rows = conn
        .query(
            "SELECT * FROM blocks \
             WHERE workspace_id = $1 \
             ORDER BY created_at DESC \
             LIMIT 100",
            &[&workspace_id],
        )
        .await?;

    let blocks = rows
        .iter()
        .map(Block::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    let shard_info = fetch_shard_info(&conn).await?;

    Ok(Json(BlockListResponse {
        blocks,
        routing: RoutingReport::new(&route, workspace_id, shard_info),
    }))
}

/// Read the shard's self-description row, if the deployment provisions one.
async fn fetch_shard_info(conn: &ShardConnection) -> ApiResult<Option<Value>> {
    let row = conn
        .query_opt("SELECT shard_name, description FROM shard_info", &[])
        .await?;
    Ok(match row {
        Some(row) => {
            let shard_name: String = row.try_get("shard_name")?;
            let description: Option<String> = row.try_get("description")?;
            Some(json!({
                "shardName": shard_name,
                "description": description,
            }))
        }
        None => None,
    })
}
