//! Business logic services for the application layer.

pub mod analytics_service;
pub mod api_key_service;
pub mod domain_service;
pub mod link_service;
pub mod resolver_service;
pub mod webhook_service;

pub use analytics_service::AnalyticsService;
pub use api_key_service::ApiKeyService;
pub use domain_service::{DomainInstructions, DomainService};
pub use link_service::{LinkService, NewLinkRequest};
pub use resolver_service::ResolverService;
pub use webhook_service::WebhookService;
