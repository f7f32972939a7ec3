//! Repository trait for short link data access.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;

/// Pagination + substring/active-flag filter for [`LinkRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// Returns [`AppError::AlreadyExists`] if `short_code` collides with a
    /// non-deleted link.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Transactionally creates up to 100 links; either all rows commit or none.
    async fn bulk_create(&self, new_links: Vec<NewLink>) -> Result<Vec<Link>, AppError>;

    /// Finds a non-deleted link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by its database ID, regardless of soft-delete state.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds a non-deleted link by destination URL within a workspace.
    async fn find_by_destination_url(
        &self,
        workspace_id: Uuid,
        destination_url: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Lists links for a workspace with pagination and filtering.
    ///
    /// `limit` is clamped to 100 by the caller.
    async fn list(
        &self,
        workspace_id: Uuid,
        filter: LinkFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Link>, i64), AppError>;

    /// Applies a partial update. Returns [`AppError::NotFound`] if `id` does
    /// not resolve to a link owned by `workspace_id`.
    async fn update(&self, id: i64, workspace_id: Uuid, patch: LinkPatch) -> Result<Link, AppError>;

    /// Soft-deletes a link by setting `deleted_at = now()`.
    async fn soft_delete(&self, id: i64, workspace_id: Uuid) -> Result<bool, AppError>;

    /// Atomically increments `total_clicks` by 1.
    async fn increment_clicks(&self, id: i64) -> Result<(), AppError>;

    /// Atomically increments `unique_clicks` by 1.
    async fn increment_unique_clicks(&self, id: i64) -> Result<(), AppError>;

    /// Counts active (non-deleted) links owned by a workspace.
    async fn count_active(&self, workspace_id: Uuid) -> Result<i64, AppError>;
}
