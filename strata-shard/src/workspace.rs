//! Workspace identifiers.

use std::fmt;

/// An opaque identifier for a workspace (tenant).
///
/// Workspace ids are treated as uninterpreted tokens except by the
/// [`resolver`](crate::resolver), which requires an 8-hex-digit prefix after
/// stripping `-` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Create a new workspace ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the workspace ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WorkspaceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<uuid::Uuid> for WorkspaceId {
    fn from(u: uuid::Uuid) -> Self {
        Self::new(u.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_id_creation() {
        let id1 = WorkspaceId::new("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
        assert_eq!(id1.as_str(), "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");

        let id2: WorkspaceId = "deadbeef-0000".into();
        assert_eq!(id2.as_str(), "deadbeef-0000");

        let uuid = uuid::Uuid::new_v4();
        let id3: WorkspaceId = uuid.into();
        assert_eq!(id3.as_str(), uuid.to_string());
    }

    #[test]
    fn test_workspace_id_display() {
        let id = WorkspaceId::new("cafebabe-1234");
        assert_eq!(id.to_string(), "cafebabe-1234");
        assert_eq!(id.into_inner(), "cafebabe-1234");
    }
}
