mod common;

use axum::{Router, middleware, routing::get};
use axum_test::TestServer;
use linkrift::AppState;
use linkrift::api::handlers::clicks;
use linkrift::api::middleware::auth;
use linkrift::domain::entities::ApiKeyScope;
use sqlx::PgPool;

fn make_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/api/v1/links/{id}/clicks", get(clicks::list_link_clicks_handler))
        .route("/api/v1/links/{id}/clicks/count", get(clicks::count_link_clicks_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[sqlx::test]
async fn test_list_link_clicks(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let user_id = common::create_test_user(&pool, workspace_id, "a@acme.test").await;
    let link_id = common::create_test_link(&pool, "popular", "https://example.com", workspace_id, user_id).await;

    for i in 1..=5 {
        common::create_test_click(&pool, link_id, &format!("192.168.1.{i}")).await;
    }

    let (state, _rx) = common::create_test_state(pool);
    let raw_key = common::issue_test_api_key(&state, workspace_id, vec![ApiKeyScope::AnalyticsRead]).await;
    let server = make_server(state);

    let response = server
        .get(&format!("/api/v1/links/{link_id}/clicks"))
        .authorization_bearer(&raw_key)
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["pagination"]["total_items"], 5);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
}

#[sqlx::test]
async fn test_list_link_clicks_paginates(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let user_id = common::create_test_user(&pool, workspace_id, "a@acme.test").await;
    let link_id = common::create_test_link(&pool, "paginate", "https://example.com", workspace_id, user_id).await;

    for i in 1..=15 {
        common::create_test_click(&pool, link_id, &format!("10.0.0.{i}")).await;
    }

    let (state, _rx) = common::create_test_state(pool);
    let raw_key = common::issue_test_api_key(&state, workspace_id, vec![ApiKeyScope::AnalyticsRead]).await;
    let server = make_server(state);

    let response = server
        .get(&format!("/api/v1/links/{link_id}/clicks"))
        .authorization_bearer(&raw_key)
        .add_query_param("page_size", "10")
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["pagination"]["total_items"], 15);
    assert_eq!(body["pagination"]["page_size"], 10);
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
}

#[sqlx::test]
async fn test_count_link_clicks(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let user_id = common::create_test_user(&pool, workspace_id, "a@acme.test").await;
    let link_id = common::create_test_link(&pool, "counted", "https://example.com", workspace_id, user_id).await;

    for i in 1..=10 {
        common::create_test_click(&pool, link_id, &format!("192.168.1.{i}")).await;
    }

    let (state, _rx) = common::create_test_state(pool);
    let raw_key = common::issue_test_api_key(&state, workspace_id, vec![ApiKeyScope::AnalyticsRead]).await;
    let server = make_server(state);

    let response = server
        .get(&format!("/api/v1/links/{link_id}/clicks/count"))
        .authorization_bearer(&raw_key)
        .await;

    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["count"], 10);
}

#[sqlx::test]
async fn test_link_clicks_require_analytics_scope(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let user_id = common::create_test_user(&pool, workspace_id, "a@acme.test").await;
    let link_id = common::create_test_link(&pool, "scoped", "https://example.com", workspace_id, user_id).await;

    let (state, _rx) = common::create_test_state(pool);
    let raw_key = common::issue_test_api_key(&state, workspace_id, vec![ApiKeyScope::LinksRead]).await;
    let server = make_server(state);

    let response = server
        .get(&format!("/api/v1/links/{link_id}/clicks"))
        .authorization_bearer(&raw_key)
        .await;

    response.assert_status_forbidden();
}

#[sqlx::test]
async fn test_link_clicks_are_scoped_to_workspace(pool: PgPool) {
    let workspace_id = common::create_test_workspace(&pool, "acme").await;
    let user_id = common::create_test_user(&pool, workspace_id, "a@acme.test").await;
    let link_id = common::create_test_link(&pool, "mine", "https://example.com", workspace_id, user_id).await;
    common::create_test_click(&pool, link_id, "192.168.1.1").await;

    let other_workspace_id = common::create_test_workspace(&pool, "other").await;

    let (state, _rx) = common::create_test_state(pool);
    let raw_key = common::issue_test_api_key(&state, other_workspace_id, vec![ApiKeyScope::AnalyticsRead]).await;
    let server = make_server(state);

    let response = server
        .get(&format!("/api/v1/links/{link_id}/clicks/count"))
        .authorization_bearer(&raw_key)
        .await;

    // The link belongs to a different workspace, so it is invisible to this key.
    response.assert_status_not_found();
}
