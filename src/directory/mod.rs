pub mod restful;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::errors::AuthError;
use crate::types::role::RoleRecord;

/// The keyed store mapping a subject identifier to its role assignment.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Looks up the role record for a subject. `None` means the directory
    /// has no record for this subject, which for an authenticated subject
    /// is an anomaly the caller must treat as such.
    async fn role_of(&self, subject_id: &str) -> Result<Option<RoleRecord>, AuthError>;
}
