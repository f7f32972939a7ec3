//! Webhook subscription management (CRUD). Delivery itself runs in the
//! WebhookDispatcher pipeline, driven by the EventBus.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::domain::entitlements::{Entitlements, Feature};
use crate::domain::entities::{Webhook, WebhookDelivery, WebhookEvent, NewWebhook};
use crate::domain::repositories::{WebhookDeliveryRepository, WebhookRepository};
use crate::error::AppError;

fn generate_secret() -> String {
    let mut buffer = [0u8; 24];
    getrandom::fill(&mut buffer).expect("failed to generate webhook secret");
    format!("whsec_{}", hex::encode(buffer))
}

fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|_| AppError::bad_request("Invalid webhook URL", json!({ "url": url })))?;
    if parsed.scheme() != "https" {
        return Err(AppError::bad_request(
            "Webhook URL must use https",
            json!({ "url": url }),
        ));
    }
    Ok(())
}

pub struct WebhookService<W: WebhookRepository, D: WebhookDeliveryRepository, E: Entitlements> {
    webhook_repository: Arc<W>,
    delivery_repository: Arc<D>,
    entitlements: Arc<E>,
}

impl<W: WebhookRepository, D: WebhookDeliveryRepository, E: Entitlements> WebhookService<W, D, E> {
    pub fn new(webhook_repository: Arc<W>, delivery_repository: Arc<D>, entitlements: Arc<E>) -> Self {
        Self {
            webhook_repository,
            delivery_repository,
            entitlements,
        }
    }

    /// Registers a new subscriber. Returns the record alongside the raw
    /// signing secret, shown to the caller exactly once.
    pub async fn create(
        &self,
        workspace_id: Uuid,
        url: String,
        events: Vec<WebhookEvent>,
    ) -> Result<(Webhook, String), AppError> {
        if !self.entitlements.has(workspace_id, Feature::Webhooks).await {
            let tier = self.entitlements.minimum_tier_for(Feature::Webhooks).await;
            return Err(AppError::payment_required("webhooks", &tier));
        }
        if events.is_empty() {
            return Err(AppError::bad_request("Webhook must subscribe to at least one event", json!({})));
        }
        validate_url(&url)?;

        let secret = generate_secret();
        let webhook = self
            .webhook_repository
            .create(NewWebhook {
                workspace_id,
                url,
                secret: secret.clone(),
                events,
            })
            .await?;

        Ok((webhook, secret))
    }

    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Webhook>, AppError> {
        self.webhook_repository.list(workspace_id).await
    }

    pub async fn delete(&self, id: Uuid, workspace_id: Uuid) -> Result<(), AppError> {
        let deleted = self.webhook_repository.delete(id, workspace_id).await?;
        if !deleted {
            return Err(AppError::not_found("Webhook not found", json!({ "webhook_id": id })));
        }
        Ok(())
    }

    async fn get_owned(&self, id: Uuid, workspace_id: Uuid) -> Result<Webhook, AppError> {
        self.webhook_repository
            .find_by_id(id)
            .await?
            .filter(|w| w.workspace_id == workspace_id)
            .ok_or_else(|| AppError::not_found("Webhook not found", json!({ "webhook_id": id })))
    }

    /// Lists delivery attempts for a webhook the caller's workspace owns.
    pub async fn list_deliveries(
        &self,
        webhook_id: Uuid,
        workspace_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<WebhookDelivery>, i64), AppError> {
        self.get_owned(webhook_id, workspace_id).await?;
        let limit = limit.clamp(1, 100);
        self.delivery_repository.list_by_webhook(webhook_id, offset, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlements::{AllowAllEntitlements, StaticPlanEntitlements};
    use crate::domain::repositories::{MockWebhookDeliveryRepository, MockWebhookRepository};

    fn sample_webhook(workspace_id: Uuid) -> Webhook {
        Webhook {
            id: Uuid::new_v4(),
            workspace_id,
            url: "https://example.com/hook".to_string(),
            secret: "whsec_x".to_string(),
            events: vec![WebhookEvent::LinkClicked],
            is_active: true,
            failure_count: 0,
            last_triggered_at: None,
            last_success_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_rejects_non_https_url() {
        let repo = MockWebhookRepository::new();
        let delivery_repo = MockWebhookDeliveryRepository::new();
        let service = WebhookService::new(Arc::new(repo), Arc::new(delivery_repo), Arc::new(AllowAllEntitlements));

        let result = service
            .create(Uuid::new_v4(), "http://example.com/hook".to_string(), vec![WebhookEvent::LinkClicked])
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn create_requires_webhooks_entitlement() {
        let repo = MockWebhookRepository::new();
        let delivery_repo = MockWebhookDeliveryRepository::new();
        let service = WebhookService::new(
            Arc::new(repo),
            Arc::new(delivery_repo),
            Arc::new(StaticPlanEntitlements::new(Default::default())),
        );

        let result = service
            .create(Uuid::new_v4(), "https://example.com/hook".to_string(), vec![WebhookEvent::LinkClicked])
            .await;
        assert!(matches!(result, Err(AppError::PaymentRequired { .. })));
    }

    #[tokio::test]
    async fn create_returns_secret_once() {
        let workspace_id = Uuid::new_v4();
        let mut repo = MockWebhookRepository::new();
        repo.expect_create()
            .returning(move |new_webhook| {
                let mut w = sample_webhook(workspace_id);
                w.secret = new_webhook.secret;
                Ok(w)
            });
        let delivery_repo = MockWebhookDeliveryRepository::new();
        let service = WebhookService::new(Arc::new(repo), Arc::new(delivery_repo), Arc::new(AllowAllEntitlements));

        let (webhook, secret) = service
            .create(workspace_id, "https://example.com/hook".to_string(), vec![WebhookEvent::LinkClicked])
            .await
            .unwrap();

        assert!(secret.starts_with("whsec_"));
        assert_eq!(webhook.secret, secret);
    }

    #[tokio::test]
    async fn list_deliveries_rejects_cross_workspace_access() {
        let owner_workspace = Uuid::new_v4();
        let mut repo = MockWebhookRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(sample_webhook(owner_workspace))));
        let delivery_repo = MockWebhookDeliveryRepository::new();
        let service = WebhookService::new(Arc::new(repo), Arc::new(delivery_repo), Arc::new(AllowAllEntitlements));

        let result = service.list_deliveries(Uuid::new_v4(), Uuid::new_v4(), 0, 20).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
