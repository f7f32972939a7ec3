mod common;

use sqlx::PgPool;
use std::sync::Arc;

use linkrift::domain::entities::{NewWebhook, WebhookEvent};
use linkrift::domain::repositories::WebhookRepository;
use linkrift::infrastructure::persistence::PgWebhookRepository;

fn new_webhook(workspace_id: uuid::Uuid, url: &str, events: Vec<WebhookEvent>) -> NewWebhook {
    NewWebhook { workspace_id, url: url.to_string(), secret: "whsec_test".to_string(), events }
}

#[sqlx::test]
async fn test_create_and_find_by_id(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let repo = PgWebhookRepository::new(Arc::new(pool));

    let created = repo
        .create(new_webhook(workspace_id, "https://hooks.acme.test/a", vec![WebhookEvent::LinkCreated]))
        .await
        .unwrap();

    let found = repo.find_by_id(created.id).await.unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().url, "https://hooks.acme.test/a");
}

#[sqlx::test]
async fn test_list_scoped_to_workspace(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let other_workspace_id = common::create_test_workspace(&pool, "other").await;
    let repo = PgWebhookRepository::new(Arc::new(pool));

    repo.create(new_webhook(workspace_id, "https://hooks.acme.test/a", vec![WebhookEvent::LinkCreated]))
        .await
        .unwrap();
    repo.create(new_webhook(other_workspace_id, "https://hooks.other.test/a", vec![WebhookEvent::LinkCreated]))
        .await
        .unwrap();

    let webhooks = repo.list(workspace_id).await.unwrap();

    assert_eq!(webhooks.len(), 1);
}

#[sqlx::test]
async fn test_find_subscribers_filters_by_event_and_active(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let repo = PgWebhookRepository::new(Arc::new(pool));

    repo.create(new_webhook(workspace_id, "https://hooks.acme.test/created", vec![WebhookEvent::LinkCreated]))
        .await
        .unwrap();
    repo.create(new_webhook(workspace_id, "https://hooks.acme.test/clicked", vec![WebhookEvent::LinkClicked]))
        .await
        .unwrap();

    let subscribers = repo.find_subscribers(workspace_id, WebhookEvent::LinkCreated).await.unwrap();

    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].url, "https://hooks.acme.test/created");
}

#[sqlx::test]
async fn test_delete(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let repo = PgWebhookRepository::new(Arc::new(pool));
    let created = repo
        .create(new_webhook(workspace_id, "https://hooks.acme.test/a", vec![WebhookEvent::LinkCreated]))
        .await
        .unwrap();

    let deleted = repo.delete(created.id, workspace_id).await.unwrap();
    assert!(deleted);

    assert!(repo.find_by_id(created.id).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_record_success_resets_failure_count(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let repo = PgWebhookRepository::new(Arc::new(pool));
    let created = repo
        .create(new_webhook(workspace_id, "https://hooks.acme.test/a", vec![WebhookEvent::LinkCreated]))
        .await
        .unwrap();

    for _ in 0..3 {
        repo.record_failure(created.id).await.unwrap();
    }
    repo.record_success(created.id).await.unwrap();

    let webhook = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(webhook.failure_count, 0);
    assert!(webhook.last_success_at.is_some());
}

#[sqlx::test]
async fn test_record_failure_disables_after_threshold(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let repo = PgWebhookRepository::new(Arc::new(pool));
    let created = repo
        .create(new_webhook(workspace_id, "https://hooks.acme.test/a", vec![WebhookEvent::LinkCreated]))
        .await
        .unwrap();

    let mut webhook = created;
    for _ in 0..linkrift::domain::entities::Webhook::DISABLE_AFTER_FAILURES {
        webhook = repo.record_failure(webhook.id).await.unwrap();
    }

    assert!(!webhook.is_active);
    assert_eq!(webhook.failure_count, linkrift::domain::entities::Webhook::DISABLE_AFTER_FAILURES);
}
