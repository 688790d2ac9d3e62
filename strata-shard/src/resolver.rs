//! Deterministic workspace-to-shard resolution.
//!
//! The resolver is a pure function: the same workspace identifier always
//! yields the same shard index for a fixed shard count. Shard indices are
//! never stored, only recomputed per request.

use crate::error::{ShardError, ShardResult};
use crate::workspace::WorkspaceId;

/// Minimum raw identifier length accepted for sharding.
const MIN_RAW_LEN: usize = 10;
/// Number of leading hex digits reduced into a shard index.
const HEX_PREFIX_LEN: usize = 8;

/// Resolve a workspace identifier to a shard index in `[0, shard_count)`.
///
/// The identifier is stripped of `-` separators and its first 8 characters
/// are interpreted as a base-16 unsigned integer, reduced modulo
/// `shard_count`.
///
/// # Errors
///
/// - [`ShardError::InvalidWorkspaceId`] when the identifier is empty, shorter
///   than 10 characters before stripping, has fewer than 8 characters after
///   stripping, or the prefix does not parse as hexadecimal.
/// - [`ShardError::InvalidConfiguration`] when `shard_count` is zero. The
///   shard count is a startup invariant, re-checked per call so the violation
///   surfaces on every affected request rather than once.
pub fn resolve(workspace_id: &WorkspaceId, shard_count: usize) -> ShardResult<usize> {
    let raw = workspace_id.as_str();
    if raw.is_empty() || raw.chars().count() < MIN_RAW_LEN {
        return Err(ShardError::invalid_workspace_id(raw));
    }

    let stripped: String = raw.chars().filter(|c| *c != '-').collect();
    let prefix: String = stripped.chars().take(HEX_PREFIX_LEN).collect();
    if prefix.chars().count() < HEX_PREFIX_LEN {
        return Err(ShardError::invalid_workspace_id(raw));
    }

    let numeric = u64::from_str_radix(&prefix, 16)
        .map_err(|_| ShardError::invalid_workspace_id(raw))?;

    if shard_count == 0 {
        return Err(ShardError::config("shard count must be a positive integer"));
    }

    Ok((numeric % shard_count as u64) as usize)
}

/// Logical database name for a shard index (`shard0`, `shard1`, ...).
pub fn shard_database_name(shard_index: usize) -> String {
    format!("shard{shard_index}")
}
