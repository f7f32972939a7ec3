//! Repository trait for webhook subscriber management.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{NewWebhook, Webhook, WebhookEvent};
use crate::error::AppError;

/// Repository interface for webhook subscriber CRUD.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgWebhookRepository`] - PostgreSQL implementation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn create(&self, new_webhook: NewWebhook) -> Result<Webhook, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Webhook>, AppError>;

    async fn list(&self, workspace_id: Uuid) -> Result<Vec<Webhook>, AppError>;

    /// Active webhooks in `workspace_id` subscribed to `event`. Backs the
    /// WebhookDispatcher's subscriber selection step.
    async fn find_subscribers(&self, workspace_id: Uuid, event: WebhookEvent) -> Result<Vec<Webhook>, AppError>;

    async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, AppError>;

    /// Resets `failure_count` to 0 and sets `last_success_at = now()`.
    async fn record_success(&self, id: Uuid) -> Result<(), AppError>;

    /// Increments `failure_count`; disables the webhook (`is_active = false`)
    /// once it reaches [`crate::domain::entities::Webhook::DISABLE_AFTER_FAILURES`].
    async fn record_failure(&self, id: Uuid) -> Result<Webhook, AppError>;
}
