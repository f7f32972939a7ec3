//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx for type-safe
//! SQL queries with compile-time verification.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage and retrieval
//! - [`PgClickRepository`] - Click tracking and analytics queries
//! - [`PgDomainRepository`] - Domain management
//! - [`PgWebhookRepository`] - Webhook subscriber CRUD
//! - [`PgWebhookDeliveryRepository`] - Per-attempt delivery records
//! - [`PgApiKeyRepository`] - Management API credentials

pub mod pg_api_key_repository;
pub mod pg_click_repository;
pub mod pg_domain_repository;
pub mod pg_link_repository;
pub mod pg_webhook_delivery_repository;
pub mod pg_webhook_repository;

pub use pg_api_key_repository::PgApiKeyRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_domain_repository::PgDomainRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_webhook_delivery_repository::PgWebhookDeliveryRepository;
pub use pg_webhook_repository::PgWebhookRepository;
