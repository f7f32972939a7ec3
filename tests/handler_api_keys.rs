mod common;

use axum::{Router, middleware, routing::get};
use axum_test::TestServer;
use linkrift::AppState;
use linkrift::api::handlers::api_keys;
use linkrift::api::middleware::auth;
use linkrift::domain::entities::ApiKeyScope;
use serde_json::json;
use sqlx::PgPool;

fn make_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route(
            "/api/v1/api-keys",
            get(api_keys::list_api_keys_handler).post(api_keys::create_api_key_handler),
        )
        .route("/api/v1/api-keys/{id}", axum::routing::delete(api_keys::revoke_api_key_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .with_state(state);
    TestServer::new(app).unwrap()
}

async fn workspace_and_key(pool: &PgPool) -> (uuid::Uuid, AppState, String) {
    let workspace_id = common::create_test_workspace(pool, "acme").await;
    let (state, _rx) = common::create_test_state(pool.clone());
    let raw_key = common::issue_test_api_key(&state, workspace_id, vec![ApiKeyScope::LinksRead]).await;
    (workspace_id, state, raw_key)
}

#[sqlx::test]
async fn test_create_api_key_success(pool: PgPool) {
    let (_workspace_id, state, raw_key) = workspace_and_key(&pool).await;
    let server = make_server(state);

    let response = server
        .post("/api/v1/api-keys")
        .authorization_bearer(&raw_key)
        .json(&json!({ "name": "ci pipeline", "scopes": ["links:read", "links:write"] }))
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["name"], "ci pipeline");
    assert_eq!(body["scopes"], json!(["links:read", "links:write"]));
    assert!(body["key"].as_str().unwrap().starts_with("lr_"));
}

#[sqlx::test]
async fn test_create_api_key_rejects_empty_scopes(pool: PgPool) {
    let (_workspace_id, state, raw_key) = workspace_and_key(&pool).await;
    let server = make_server(state);

    let response = server
        .post("/api/v1/api-keys")
        .authorization_bearer(&raw_key)
        .json(&json!({ "name": "no scopes", "scopes": [] }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_create_api_key_rejects_unknown_scope(pool: PgPool) {
    let (_workspace_id, state, raw_key) = workspace_and_key(&pool).await;
    let server = make_server(state);

    let response = server
        .post("/api/v1/api-keys")
        .authorization_bearer(&raw_key)
        .json(&json!({ "name": "bad scope", "scopes": ["not:a:scope"] }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_list_api_keys_includes_self_and_new_keys(pool: PgPool) {
    let (_workspace_id, state, raw_key) = workspace_and_key(&pool).await;
    let server = make_server(state);

    server
        .post("/api/v1/api-keys")
        .authorization_bearer(&raw_key)
        .json(&json!({ "name": "second key", "scopes": ["links:read"] }))
        .await
        .assert_status_ok();

    let response = server.get("/api/v1/api-keys").authorization_bearer(&raw_key).await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert!(body["items"][0].get("key").is_none());
}

#[sqlx::test]
async fn test_revoke_api_key(pool: PgPool) {
    let (_workspace_id, state, raw_key) = workspace_and_key(&pool).await;
    let server = make_server(state);

    let create_response = server
        .post("/api/v1/api-keys")
        .authorization_bearer(&raw_key)
        .json(&json!({ "name": "throwaway", "scopes": ["links:read"] }))
        .await;
    let key_id = create_response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/api/v1/api-keys/{key_id}"))
        .authorization_bearer(&raw_key)
        .await;

    response.assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[sqlx::test]
async fn test_revoked_key_cannot_authenticate(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let (state, _rx) = common::create_test_state(pool);
    let raw_key = common::issue_test_api_key(&state, workspace_id, vec![ApiKeyScope::LinksRead]).await;
    let server = make_server(state.clone());

    let list_response = server.get("/api/v1/api-keys").authorization_bearer(&raw_key).await;
    let key_id = list_response.json::<serde_json::Value>()["items"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    server
        .delete(&format!("/api/v1/api-keys/{key_id}"))
        .authorization_bearer(&raw_key)
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server.get("/api/v1/api-keys").authorization_bearer(&raw_key).await;

    response.assert_status_unauthorized();
}
