//! Repository trait for custom-domain management.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Domain, NewDomain, UpdateDomain};
use crate::error::AppError;

/// Repository interface for managing tenant-claimed custom domains.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgDomainRepository`] - PostgreSQL implementation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Creates a new domain claim. Returns [`AppError::AlreadyExists`] if the
    /// hostname is already claimed by a non-deleted domain.
    async fn create(&self, new_domain: NewDomain) -> Result<Domain, AppError>;

    /// Finds a domain by its database ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Domain>, AppError>;

    /// Finds a non-deleted domain by hostname.
    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Domain>, AppError>;

    /// Lists non-deleted domains owned by a workspace.
    async fn list(&self, workspace_id: Uuid) -> Result<Vec<Domain>, AppError>;

    /// Applies a partial update. Returns [`AppError::NotFound`] if `id` does
    /// not resolve to a domain owned by `workspace_id`.
    async fn update(&self, id: i64, workspace_id: Uuid, patch: UpdateDomain) -> Result<Domain, AppError>;

    /// Soft-deletes a domain.
    async fn soft_delete(&self, id: i64, workspace_id: Uuid) -> Result<bool, AppError>;

    /// Counts non-deleted domains owned by a workspace (for entitlement limits).
    async fn count_active(&self, workspace_id: Uuid) -> Result<i64, AppError>;
}
