//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic beyond small
//! derived predicates (`is_expired`, `is_click_limited`, ...). Each mutable
//! entity follows the `New*`/`*Patch` pattern: a `New*` struct for creation
//! and, where partial updates exist, a `*Patch`/`Update*` struct using
//! `Option<Option<T>>` to distinguish "leave unchanged" from "clear".

pub mod api_key;
pub mod click;
pub mod domain;
pub mod link;
pub mod tenant;
pub mod webhook;
pub mod webhook_delivery;

pub use api_key::{ApiKey, ApiKeyScope, NewApiKey};
pub use click::{Click, DeviceType, NewClick};
pub use domain::{Domain, NewDomain, SslStatus, UpdateDomain};
pub use link::{Link, LinkPatch, NewLink};
pub use tenant::{User, Workspace};
pub use webhook::{NewWebhook, Webhook, WebhookEvent};
pub use webhook_delivery::{
    NewWebhookDelivery, WebhookDelivery, RESPONSE_BODY_TRUNCATE_BYTES, RETRY_DELAYS,
};
