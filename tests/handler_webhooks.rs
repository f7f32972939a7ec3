mod common;

use axum::{Router, middleware, routing::get};
use axum_test::TestServer;
use linkrift::AppState;
use linkrift::api::handlers::webhooks;
use linkrift::api::middleware::auth;
use linkrift::domain::entities::ApiKeyScope;
use serde_json::json;
use sqlx::PgPool;

fn make_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route(
            "/api/v1/webhooks",
            get(webhooks::list_webhooks_handler).post(webhooks::create_webhook_handler),
        )
        .route("/api/v1/webhooks/{id}", axum::routing::delete(webhooks::delete_webhook_handler))
        .route("/api/v1/webhooks/{id}/deliveries", get(webhooks::list_webhook_deliveries_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .with_state(state);
    TestServer::new(app).unwrap()
}

async fn pro_workspace_and_key(pool: &PgPool, scopes: Vec<ApiKeyScope>) -> (uuid::Uuid, AppState, String) {
    let workspace_id = common::create_test_workspace(pool, "acme").await;
    let (state, _rx) = common::create_test_state_with_pro_workspaces(pool.clone(), [workspace_id].into());
    let raw_key = common::issue_test_api_key(&state, workspace_id, scopes).await;
    (workspace_id, state, raw_key)
}

#[sqlx::test]
async fn test_create_webhook_success(pool: PgPool) {
    let (_workspace_id, state, raw_key) = pro_workspace_and_key(&pool, vec![ApiKeyScope::WebhooksWrite]).await;
    let server = make_server(state);

    let response = server
        .post("/api/v1/webhooks")
        .authorization_bearer(&raw_key)
        .json(&json!({ "url": "https://hooks.acme.test/linkrift", "events": ["link.created"] }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["url"], "https://hooks.acme.test/linkrift");
    assert_eq!(body["events"], json!(["link.created"]));
    assert!(body["secret"].as_str().unwrap().len() > 0);
}

#[sqlx::test]
async fn test_create_webhook_rejects_non_https_url(pool: PgPool) {
    let (_workspace_id, state, raw_key) = pro_workspace_and_key(&pool, vec![ApiKeyScope::WebhooksWrite]).await;
    let server = make_server(state);

    let response = server
        .post("/api/v1/webhooks")
        .authorization_bearer(&raw_key)
        .json(&json!({ "url": "http://hooks.acme.test/linkrift", "events": ["link.created"] }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_create_webhook_rejects_unknown_event(pool: PgPool) {
    let (_workspace_id, state, raw_key) = pro_workspace_and_key(&pool, vec![ApiKeyScope::WebhooksWrite]).await;
    let server = make_server(state);

    let response = server
        .post("/api/v1/webhooks")
        .authorization_bearer(&raw_key)
        .json(&json!({ "url": "https://hooks.acme.test/linkrift", "events": ["not.a.real.event"] }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_create_webhook_requires_pro_tier(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "startup").await;
    let (state, _rx) = common::create_test_state(pool);
    let raw_key = common::issue_test_api_key(&state, workspace_id, vec![ApiKeyScope::WebhooksWrite]).await;
    let server = make_server(state);

    let response = server
        .post("/api/v1/webhooks")
        .authorization_bearer(&raw_key)
        .json(&json!({ "url": "https://hooks.startup.test/linkrift", "events": ["link.created"] }))
        .await;

    response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);
}

#[sqlx::test]
async fn test_list_webhooks(pool: PgPool) {
    let (_workspace_id, state, raw_key) =
        pro_workspace_and_key(&pool, vec![ApiKeyScope::WebhooksRead, ApiKeyScope::WebhooksWrite]).await;
    let server = make_server(state);

    server
        .post("/api/v1/webhooks")
        .authorization_bearer(&raw_key)
        .json(&json!({ "url": "https://hooks.acme.test/a", "events": ["link.created"] }))
        .await
        .assert_status_ok();

    let response = server.get("/api/v1/webhooks").authorization_bearer(&raw_key).await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    // The secret is only ever returned at creation time.
    assert!(body["items"][0].get("secret").is_none());
}

#[sqlx::test]
async fn test_delete_webhook_success(pool: PgPool) {
    let (_workspace_id, state, raw_key) =
        pro_workspace_and_key(&pool, vec![ApiKeyScope::WebhooksRead, ApiKeyScope::WebhooksWrite]).await;
    let server = make_server(state);

    let create_response = server
        .post("/api/v1/webhooks")
        .authorization_bearer(&raw_key)
        .json(&json!({ "url": "https://hooks.acme.test/b", "events": ["link.created"] }))
        .await;
    let webhook_id = create_response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/api/v1/webhooks/{webhook_id}"))
        .authorization_bearer(&raw_key)
        .await;

    response.assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[sqlx::test]
async fn test_list_webhook_deliveries_empty(pool: PgPool) {
    let (_workspace_id, state, raw_key) =
        pro_workspace_and_key(&pool, vec![ApiKeyScope::WebhooksRead, ApiKeyScope::WebhooksWrite]).await;
    let server = make_server(state);

    let create_response = server
        .post("/api/v1/webhooks")
        .authorization_bearer(&raw_key)
        .json(&json!({ "url": "https://hooks.acme.test/c", "events": ["link.created"] }))
        .await;
    let webhook_id = create_response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

    let response = server
        .get(&format!("/api/v1/webhooks/{webhook_id}/deliveries"))
        .authorization_bearer(&raw_key)
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}
