//! Repository trait for Management API credentials.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{ApiKey, NewApiKey};
use crate::error::AppError;

/// Repository interface for API key CRUD and lookup.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgApiKeyRepository`] - PostgreSQL implementation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError>;

    /// Looks up a key by its clear-text prefix, used to avoid a full table
    /// scan before verifying the HMAC of the full raw key.
    async fn find_by_prefix(&self, key_prefix: &str) -> Result<Option<ApiKey>, AppError>;

    async fn list(&self, workspace_id: Uuid) -> Result<Vec<ApiKey>, AppError>;

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;

    async fn revoke(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, AppError>;
}
