//! API error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use strata_shard::error::ShardError;

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the HTTP layer.
///
/// Each variant carries a typed kind; the HTTP status is chosen by matching
/// the kind, never by inspecting error messages.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Routing or database failure from the shard layer.
    #[error(transparent)]
    Shard(#[from] ShardError),

    /// Block does not exist on the routed shard.
    #[error("block {id} not found on shard {shard_index}")]
    BlockNotFound { id: Uuid, shard_index: usize },

    /// Block exists but belongs to a different workspace.
    #[error("block {id} does not belong to workspace {workspace_id} on shard {shard_index}")]
    WorkspaceMismatch {
        id: Uuid,
        workspace_id: String,
        shard_index: usize,
    },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Shard(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Shard(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BlockNotFound { .. } => StatusCode::NOT_FOUND,
            Self::WorkspaceMismatch { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Short machine-readable label for the response body.
    fn label(&self) -> &'static str {
        match self {
            Self::Shard(e) if e.is_client_error() => "invalid workspace id",
            Self::Shard(ShardError::InvalidConfiguration(_)) => "configuration error",
            Self::Shard(ShardError::PoolUnavailable(_)) => "pool unavailable",
            Self::Shard(_) => "database error",
            Self::BlockNotFound { .. } => "block not found",
            Self::WorkspaceMismatch { .. } => "workspace mismatch",
        }
    }
}

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Shard(ShardError::Postgres(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = json!({
            "error": self.label(),
            "details": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
