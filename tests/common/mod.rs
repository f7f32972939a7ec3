#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::mpsc;
use uuid::Uuid;

use linkrift::config::{Config, RedirectStatus};
use linkrift::domain::click_event::ClickEvent;
use linkrift::domain::event_bus::ChannelEventBus;
use linkrift::state::AppState;

/// Minimal config suitable for integration tests: no Redis, no GeoIP, a
/// fixed signing secret so API-key tests can hash/verify deterministically.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        redis_url: None,
        redirect_listen_addr: "127.0.0.1:0".to_string(),
        api_listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        behind_proxy: false,
        redirect_base_url: "https://lnkr.test".to_string(),
        redirect_default_status: RedirectStatus::Temporary,
        access_token_ttl: Duration::from_secs(900),
        refresh_token_ttl: Duration::from_secs(168 * 3600),
        cache_ttl: Duration::from_secs(300),
        click_queue_capacity: 1_000,
        click_workers: 2,
        webhook_workers: 2,
        webhook_timeout: Duration::from_secs(10),
        webhook_max_attempts: 5,
        shortcode_length: 7,
        rate_limit_requests: 1_000,
        rate_limit_window: Duration::from_secs(60),
        token_signing_secret: "test-signing-secret".to_string(),
        geoip_db_path: None,
        db_max_connections: 5,
        db_connect_timeout: 5,
        db_idle_timeout: 600,
        db_max_lifetime: 1800,
    }
}

/// Builds an `AppState` wired to NullCache and a fresh channel event bus,
/// returning the click receiver so tests can assert on enqueued clicks.
/// Every workspace is on the free tier.
pub fn create_test_state(pool: PgPool) -> (AppState, mpsc::Receiver<ClickEvent>) {
    create_test_state_with_pro_workspaces(pool, HashSet::new())
}

/// Same as [`create_test_state`], but with `pro_workspaces` entitled to the
/// paid feature set (custom domains, webhooks, advanced analytics).
pub fn create_test_state_with_pro_workspaces(
    pool: PgPool,
    pro_workspaces: HashSet<Uuid>,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let pool = Arc::new(pool);
    let config = test_config();
    let (click_tx, click_rx) = mpsc::channel(100);
    let (event_bus, _webhook_rx) = ChannelEventBus::new();

    let state = AppState::new(
        pool,
        &config,
        click_tx,
        Arc::new(linkrift::infrastructure::cache::NullCache::new()),
        Arc::new(event_bus),
        pro_workspaces,
    );

    (state, click_rx)
}

pub async fn create_test_workspace(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar!(
        "INSERT INTO workspaces (name, plan_tier) VALUES ($1, 'free') RETURNING id",
        name
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_user(pool: &PgPool, workspace_id: Uuid, email: &str) -> Uuid {
    sqlx::query_scalar!(
        "INSERT INTO users (workspace_id, email) VALUES ($1, $2) RETURNING id",
        workspace_id,
        email
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_link(pool: &PgPool, code: &str, url: &str, workspace_id: Uuid, user_id: Uuid) -> i64 {
    sqlx::query_scalar!(
        "INSERT INTO links (short_code, destination_url, workspace_id, user_id) VALUES ($1, $2, $3, $4) RETURNING id",
        code,
        url,
        workspace_id,
        user_id
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_deleted_link(pool: &PgPool, code: &str, url: &str, workspace_id: Uuid, user_id: Uuid) -> i64 {
    sqlx::query_scalar!(
        r#"
        INSERT INTO links (short_code, destination_url, workspace_id, user_id, deleted_at)
        VALUES ($1, $2, $3, $4, now())
        RETURNING id
        "#,
        code,
        url,
        workspace_id,
        user_id
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_expired_link(pool: &PgPool, code: &str, url: &str, workspace_id: Uuid, user_id: Uuid) -> i64 {
    sqlx::query_scalar!(
        r#"
        INSERT INTO links (short_code, destination_url, workspace_id, user_id, expires_at)
        VALUES ($1, $2, $3, $4, now() - interval '1 hour')
        RETURNING id
        "#,
        code,
        url,
        workspace_id,
        user_id
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_domain(pool: &PgPool, workspace_id: Uuid, hostname: &str) -> i64 {
    sqlx::query_scalar!(
        r#"
        INSERT INTO domains (workspace_id, domain, dns_records)
        VALUES ($1, $2, '{"verification_token": "tok_test"}'::jsonb)
        RETURNING id
        "#,
        workspace_id,
        hostname
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_click(pool: &PgPool, link_id: i64, visitor_id: &str) {
    sqlx::query!(
        "INSERT INTO clicks (link_id, visitor_id, clicked_at) VALUES ($1, $2, $3)",
        link_id,
        visitor_id,
        Utc::now(),
    )
    .execute(pool)
    .await
    .unwrap();
}

/// Issues a live API key for `workspace_id` with the given scopes, returning
/// the raw `Authorization: Bearer` value handler tests can send.
pub async fn issue_test_api_key(
    state: &AppState,
    workspace_id: Uuid,
    scopes: Vec<linkrift::domain::entities::ApiKeyScope>,
) -> String {
    let (_key, raw) = state
        .api_key_service
        .issue(workspace_id, "test key".to_string(), scopes, None, None)
        .await
        .unwrap();
    raw
}
