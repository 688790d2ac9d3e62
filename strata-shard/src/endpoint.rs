//! Proxy endpoint selection.

use std::fmt;

use crate::error::{ShardError, ShardResult};

/// A PgBouncer proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    /// Host name or address of the proxy.
    pub host: String,
    /// Listen port of the proxy.
    pub port: u16,
}

impl ProxyEndpoint {
    /// Create a new proxy endpoint descriptor.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Select the proxy endpoint serving a shard.
///
/// Selection is `endpoints[shard_index % endpoints.len()]`. The endpoint
/// count is independent of the shard count, so several shards may share one
/// proxy.
///
/// # Errors
///
/// [`ShardError::InvalidConfiguration`] on an empty endpoint list; the list
/// is a startup invariant the caller validates before serving traffic.
pub fn select_endpoint(
    shard_index: usize,
    endpoints: &[ProxyEndpoint],
) -> ShardResult<&ProxyEndpoint> {
    if endpoints.is_empty() {
        return Err(ShardError::config("proxy endpoint list must not be empty"));
    }
    Ok(&endpoints[shard_index % endpoints.len()])
}
