//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern;
//! concrete implementations live in `crate::infrastructure::persistence`.
//! Mock implementations are auto-generated via `mockall` for testing.
//!
//! # Available repositories
//!
//! - [`LinkRepository`] - link CRUD, counters
//! - [`ClickRepository`] - AnalyticsStore: click persistence and queries
//! - [`DomainRepository`] - custom-domain lifecycle
//! - [`WebhookRepository`] - webhook subscriber CRUD
//! - [`WebhookDeliveryRepository`] - per-attempt delivery records
//! - [`ApiKeyRepository`] - Management API credentials

pub mod api_key_repository;
pub mod click_repository;
pub mod domain_repository;
pub mod link_repository;
pub mod webhook_delivery_repository;
pub mod webhook_repository;

pub use api_key_repository::ApiKeyRepository;
pub use click_repository::{ClickFilter, ClickRepository};
pub use domain_repository::DomainRepository;
pub use link_repository::{LinkFilter, LinkRepository};
pub use webhook_delivery_repository::WebhookDeliveryRepository;
pub use webhook_repository::WebhookRepository;

#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use domain_repository::MockDomainRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use webhook_delivery_repository::MockWebhookDeliveryRepository;
#[cfg(test)]
pub use webhook_repository::MockWebhookRepository;
