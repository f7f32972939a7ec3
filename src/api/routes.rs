//! Management API route configuration.
//!
//! Every route here requires Bearer API-key authentication via
//! [`crate::api::middleware::auth`], applied by the caller as a layer over
//! the router this function returns.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{api_keys, clicks, domains, links, webhooks};
use crate::state::AppState;

/// All `/api/v1` Management API routes.
///
/// - `POST   /links`                        - Create a link
/// - `POST   /links/bulk`                   - Create up to 100 links
/// - `GET    /links`                        - List links
/// - `GET    /links/{id}`                   - Get a link
/// - `PATCH  /links/{id}`                   - Update a link
/// - `DELETE /links/{id}`                   - Soft-delete a link
/// - `GET    /links/{id}/clicks`            - Paginated click history
/// - `GET    /links/{id}/clicks/count`      - Click count
/// - `POST   /domains`                      - Claim a custom domain
/// - `GET    /domains`                      - List domains
/// - `GET    /domains/{id}`                 - Get a domain
/// - `POST   /domains/{id}/verify`          - Re-check DNS verification
/// - `DELETE /domains/{id}`                 - Remove a domain
/// - `POST   /webhooks`                     - Register a webhook subscriber
/// - `GET    /webhooks`                     - List webhooks
/// - `DELETE /webhooks/{id}`                - Remove a webhook
/// - `GET    /webhooks/{id}/deliveries`     - Delivery history
/// - `POST   /api-keys`                     - Issue a new API key
/// - `GET    /api-keys`                     - List API keys
/// - `DELETE /api-keys/{id}`                - Revoke an API key
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(links::create_link_handler).get(links::list_links_handler))
        .route("/links/bulk", post(links::bulk_create_link_handler))
        .route(
            "/links/{id}",
            get(links::get_link_handler)
                .patch(links::update_link_handler)
                .delete(links::delete_link_handler),
        )
        .route("/links/{id}/clicks", get(clicks::list_link_clicks_handler))
        .route("/links/{id}/clicks/count", get(clicks::count_link_clicks_handler))
        .route("/domains", post(domains::create_domain_handler).get(domains::list_domains_handler))
        .route("/domains/{id}", get(domains::get_domain_handler).delete(domains::delete_domain_handler))
        .route("/domains/{id}/verify", post(domains::verify_domain_handler))
        .route("/webhooks", post(webhooks::create_webhook_handler).get(webhooks::list_webhooks_handler))
        .route("/webhooks/{id}", delete(webhooks::delete_webhook_handler))
        .route("/webhooks/{id}/deliveries", get(webhooks::list_webhook_deliveries_handler))
        .route(
            "/api-keys",
            post(api_keys::create_api_key_handler).get(api_keys::list_api_keys_handler),
        )
        .route("/api-keys/{id}", delete(api_keys::revoke_api_key_handler))
}
