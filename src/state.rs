//! Application state shared across HTTP handlers.
//!
//! Contains service instances, database pool, cache, and channels for
//! asynchronous click processing. Cloned for each request via Axum's
//! state extraction.

use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::application::services::{
    AnalyticsService, ApiKeyService, DomainService, LinkService, ResolverService, WebhookService,
};
use crate::config::Config;
use crate::domain::click_event::ClickEvent;
use crate::domain::dns_resolver::{DNSResolver, HickoryDnsResolver};
use crate::domain::entitlements::StaticPlanEntitlements;
use crate::domain::event_bus::ChannelEventBus;
use crate::domain::ssl_provider::{NullSslProvider, SSLProvider};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{
    PgApiKeyRepository, PgClickRepository, PgDomainRepository, PgLinkRepository, PgWebhookDeliveryRepository,
    PgWebhookRepository,
};

type Cache = Arc<dyn CacheService>;
type Resolver = Arc<dyn DNSResolver>;
type Ssl = Arc<dyn SSLProvider>;

/// Shared application state injected into HTTP handlers.
///
/// Contains all services and infrastructure components needed to process requests.
/// Cheap to clone due to `Arc` wrapping.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<PgLinkRepository, Cache, ChannelEventBus>>,
    pub resolver_service: Arc<ResolverService<PgLinkRepository, Cache>>,
    pub domain_service: Arc<DomainService<PgDomainRepository, Resolver, Ssl, ChannelEventBus, StaticPlanEntitlements>>,
    pub api_key_service: Arc<ApiKeyService<PgApiKeyRepository>>,
    pub webhook_service: Arc<WebhookService<PgWebhookRepository, PgWebhookDeliveryRepository, StaticPlanEntitlements>>,
    pub analytics_service: Arc<AnalyticsService<PgLinkRepository, PgClickRepository>>,

    pub cache: Cache,

    pub click_sender: mpsc::Sender<ClickEvent>,

    pub config: Arc<Config>,

    pub db_pool: Arc<PgPool>,
}

impl AppState {
    /// Creates a new application state with initialized services.
    ///
    /// # Arguments
    ///
    /// - `pool` - Database connection pool
    /// - `config` - Loaded configuration
    /// - `click_sender` - Channel sender for async click processing
    /// - `cache` - Cache implementation (Redis or NullCache)
    /// - `event_bus` - Shared event bus, also consumed by the WebhookDispatcher
    /// - `pro_workspaces` - Workspaces entitled to the paid feature set
    pub fn new(
        pool: Arc<PgPool>,
        config: &Config,
        click_sender: mpsc::Sender<ClickEvent>,
        cache: Cache,
        event_bus: Arc<ChannelEventBus>,
        pro_workspaces: HashSet<Uuid>,
    ) -> Self {
        let link_repo = Arc::new(PgLinkRepository::new(pool.clone()));
        let domain_repo = Arc::new(PgDomainRepository::new(pool.clone()));
        let api_key_repo = Arc::new(PgApiKeyRepository::new(pool.clone()));
        let webhook_repo = Arc::new(PgWebhookRepository::new(pool.clone()));
        let webhook_delivery_repo = Arc::new(PgWebhookDeliveryRepository::new(pool.clone()));
        let click_repo = Arc::new(PgClickRepository::new(pool.clone()));

        let dns_resolver: Resolver = match HickoryDnsResolver::from_system_conf() {
            Ok(resolver) => Arc::new(resolver),
            Err(e) => {
                tracing::warn!(error = ?e, "failed to initialize system DNS resolver, domain verification will fail");
                Arc::new(crate::domain::dns_resolver::StaticDnsResolver::empty())
            }
        };
        let ssl_provider: Ssl = Arc::new(NullSslProvider);
        let entitlements = Arc::new(StaticPlanEntitlements::new(pro_workspaces));

        let link_service = Arc::new(LinkService::new(
            link_repo.clone(),
            Arc::new(cache.clone()),
            event_bus.clone(),
            config.shortcode_length,
        ));

        let resolver_service = Arc::new(ResolverService::new(
            link_repo.clone(),
            Arc::new(cache.clone()),
            click_sender.clone(),
            config.cache_ttl.as_secs() as usize,
            config.token_signing_secret.clone(),
        ));

        let domain_service = Arc::new(DomainService::new(
            domain_repo,
            Arc::new(dns_resolver),
            Arc::new(ssl_provider),
            event_bus.clone(),
            entitlements.clone(),
            config.redirect_base_url.clone(),
        ));

        let api_key_service = Arc::new(ApiKeyService::new(api_key_repo, config.token_signing_secret.clone()));

        let webhook_service = Arc::new(WebhookService::new(webhook_repo, webhook_delivery_repo, entitlements));

        let analytics_service = Arc::new(AnalyticsService::new(link_repo, click_repo));

        Self {
            link_service,
            resolver_service,
            domain_service,
            api_key_service,
            webhook_service,
            analytics_service,
            cache,
            click_sender,
            config: Arc::new(config.clone()),
            db_pool: pool,
        }
    }
}
