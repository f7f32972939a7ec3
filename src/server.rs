//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum
//! server lifecycle for the two listeners this service binds: the public
//! redirect host and the Management API host.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::enrichment::GeoLookup;
use crate::domain::event_bus::ChannelEventBus;
use crate::domain::webhook_dispatcher::run_webhook_dispatcher;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository, PgWebhookDeliveryRepository, PgWebhookRepository};
use crate::routes::{api_router, redirect_router};
use crate::state::AppState;

/// Broadcast channel capacity for live click notifications (currently
/// unconsumed outside the click worker; reserved for a future streaming
/// endpoint).
const CLICK_NOTIFICATION_CAPACITY: usize = 1024;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and runs pending migrations
/// - Redis cache (or [`NullCache`] fallback if Redis is unavailable or unconfigured)
/// - The shared event bus consumed by the webhook dispatcher
/// - Background click worker and webhook dispatcher
/// - Two Axum listeners (redirect host, Management API host) with graceful shutdown
///
/// # Shutdown
///
/// On shutdown signal both HTTP listeners stop accepting new connections and
/// wait for in-flight requests to complete. Afterwards the click worker and
/// webhook dispatcher drain their channels before exiting.
///
/// # Errors
///
/// Returns an error if the database connection, migration, or either server
/// bind fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await.expect("Failed to migrate");

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl.as_secs() as usize).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let (event_bus, webhook_rx) = ChannelEventBus::new();
    let event_bus = Arc::new(event_bus);
    let (click_notifications_tx, _click_notifications_rx) = broadcast::channel(CLICK_NOTIFICATION_CAPACITY);

    let pool_arc = Arc::new(pool);
    let click_repo = Arc::new(PgClickRepository::new(pool_arc.clone()));
    let link_repo = Arc::new(PgLinkRepository::new(pool_arc.clone()));
    let webhook_repo = Arc::new(PgWebhookRepository::new(pool_arc.clone()));
    let webhook_delivery_repo = Arc::new(PgWebhookDeliveryRepository::new(pool_arc.clone()));

    let geo = Arc::new(GeoLookup::open(config.geoip_db_path.as_deref()));

    let click_worker_handle = tokio::spawn(run_click_worker(
        click_rx,
        click_repo,
        link_repo,
        event_bus.clone(),
        geo,
        click_notifications_tx,
        config.click_workers,
    ));
    tracing::info!("Click worker started");

    let webhook_dispatcher_handle = tokio::spawn(run_webhook_dispatcher(
        webhook_rx,
        webhook_repo,
        webhook_delivery_repo,
        config.webhook_max_attempts as i32,
        config.webhook_workers,
    ));
    tracing::info!("Webhook dispatcher started");

    let pro_workspaces = load_pro_workspaces();
    let state = AppState::new(pool_arc, &config, click_tx, cache, event_bus, pro_workspaces);

    let redirect_addr: SocketAddr = config.redirect_listen_addr.parse()?;
    let api_addr: SocketAddr = config.api_listen_addr.parse()?;

    let redirect_app = redirect_router(state.clone());
    let api_app = api_router(state);

    let redirect_listener = tokio::net::TcpListener::bind(redirect_addr).await?;
    let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
    tracing::info!("Redirect host listening on http://{redirect_addr}");
    tracing::info!("Management API listening on http://{api_addr}");

    let redirect_server = axum::serve(
        redirect_listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(redirect_app),
    )
    .with_graceful_shutdown(shutdown_signal());

    let api_server = axum::serve(
        api_listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(api_app),
    )
    .with_graceful_shutdown(shutdown_signal());

    tokio::try_join!(redirect_server, api_server)?;

    tracing::info!("HTTP servers stopped, draining background workers...");
    click_worker_handle.await.ok();
    webhook_dispatcher_handle.await.ok();
    tracing::info!("Background workers stopped, shutdown complete");

    Ok(())
}

/// Loads the set of workspaces entitled to the paid feature set from
/// `PRO_WORKSPACE_IDS`, a comma-separated list of UUIDs. Empty/unset means
/// every workspace is on the free tier.
fn load_pro_workspaces() -> HashSet<Uuid> {
    std::env::var("PRO_WORKSPACE_IDS")
        .ok()
        .map(|raw| raw.split(',').filter_map(|s| Uuid::parse_str(s.trim()).ok()).collect())
        .unwrap_or_default()
}

/// Resolves on Ctrl-C (all platforms) or SIGTERM (Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
