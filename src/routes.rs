//! Top-level router configuration for the two listeners this service binds.

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::{health, redirect};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;

/// Router for the public redirect host (`Config::redirect_listen_addr`).
///
/// - `GET /{code}` - resolve and redirect, rate-limited per client IP
/// - `GET /healthz` - liveness/readiness probe
pub fn redirect_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/{code}", get(redirect::redirect_handler).layer(rate_limit::layer()))
        .route("/healthz", get(health::health_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Router for the Management API host (`Config::api_listen_addr`).
///
/// Every route under `/api/v1` requires Bearer API-key authentication.
pub fn api_router(state: AppState) -> NormalizePath<Router> {
    let v1 = api::routes::api_v1_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::secure_layer());

    let router = Router::new()
        .nest("/api/v1", v1)
        .route("/healthz", get(health::health_handler))
        .route("/", get(|| async { StatusCode::OK }))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
