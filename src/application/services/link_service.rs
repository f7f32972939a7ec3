//! LinkStore: authoritative short-link CRUD, the source of truth the
//! Resolver and Cache ultimately defer to.

use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkPatch, NewLink, WebhookEvent};
use crate::domain::event_bus::EventBus;
use crate::domain::repositories::{LinkFilter, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::url_normalizer::normalize_url;

const MAX_CODE_GENERATION_ATTEMPTS: usize = 5;
const MAX_BULK_CREATE: usize = 100;
const MAX_LIST_LIMIT: i64 = 100;

/// Caller-facing input for [`LinkService::create`]. `password` is plaintext;
/// the service hashes it with Argon2id before it ever reaches the repository.
#[derive(Debug, Clone, Default)]
pub struct NewLinkRequest {
    pub short_code: Option<String>,
    pub destination_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
    pub is_active: bool,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i32>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub workspace_id: Uuid,
    pub user_id: Option<Uuid>,
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::fatal("failed to hash link password", json!({ "error": e.to_string() })))
}

/// LinkStore (L): owns link identity, policy fields, and denormalized click
/// counters. Every mutator invalidates C and publishes a domain event;
/// neither side-effect changing the outcome of the mutation itself.
pub struct LinkService<L: LinkRepository, C: CacheService, EB: EventBus> {
    link_repository: Arc<L>,
    cache: Arc<C>,
    event_bus: Arc<EB>,
    shortcode_length: usize,
}

impl<L: LinkRepository, C: CacheService, EB: EventBus> LinkService<L, C, EB> {
    pub fn new(link_repository: Arc<L>, cache: Arc<C>, event_bus: Arc<EB>, shortcode_length: usize) -> Self {
        Self {
            link_repository,
            cache,
            event_bus,
            shortcode_length,
        }
    }

    /// Creates a single short link.
    ///
    /// `destination_url` is normalized before persistence; `short_code` is
    /// validated if caller-supplied, or generated with up to
    /// [`MAX_CODE_GENERATION_ATTEMPTS`] collision retries otherwise.
    pub async fn create(&self, request: NewLinkRequest) -> Result<Link, AppError> {
        let destination_url = normalize_url(&request.destination_url)
            .map_err(|e| AppError::bad_request("Invalid destination URL", json!({ "reason": e.to_string() })))?;

        let password_hash = request.password.as_deref().map(hash_password).transpose()?;

        let short_code = match request.short_code {
            Some(custom) => {
                validate_custom_code(&custom)?;
                if self.link_repository.find_by_code(&custom).await?.is_some() {
                    return Err(AppError::already_exists(
                        "This short code is already in use",
                        json!({ "short_code": custom }),
                    ));
                }
                custom
            }
            None => self.generate_unique_code().await?,
        };

        let new_link = NewLink {
            short_code: Some(short_code),
            destination_url,
            title: request.title,
            description: request.description,
            favicon_url: request.favicon_url,
            og_image_url: request.og_image_url,
            is_active: request.is_active,
            password_hash,
            expires_at: request.expires_at,
            max_clicks: request.max_clicks,
            utm_source: request.utm_source,
            utm_medium: request.utm_medium,
            utm_campaign: request.utm_campaign,
            utm_term: request.utm_term,
            utm_content: request.utm_content,
            workspace_id: request.workspace_id,
            user_id: request.user_id,
        };

        let link = self.link_repository.create(new_link).await?;

        self.event_bus
            .publish(
                WebhookEvent::LinkCreated,
                link.workspace_id,
                json!({ "link_id": link.id, "short_code": link.short_code }),
            )
            .await;

        Ok(link)
    }

    /// Transactionally creates up to [`MAX_BULK_CREATE`] links.
    pub async fn bulk_create(&self, requests: Vec<NewLinkRequest>) -> Result<Vec<Link>, AppError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        if requests.len() > MAX_BULK_CREATE {
            return Err(AppError::bad_request(
                "Cannot bulk-create more than 100 links at once",
                json!({ "requested": requests.len(), "max": MAX_BULK_CREATE }),
            ));
        }

        let mut new_links = Vec::with_capacity(requests.len());
        for request in requests {
            let destination_url = normalize_url(&request.destination_url).map_err(|e| {
                AppError::bad_request("Invalid destination URL", json!({ "reason": e.to_string() }))
            })?;
            let password_hash = request.password.as_deref().map(hash_password).transpose()?;
            let short_code = match request.short_code {
                Some(custom) => {
                    validate_custom_code(&custom)?;
                    custom
                }
                None => generate_code(self.shortcode_length),
            };

            new_links.push(NewLink {
                short_code: Some(short_code),
                destination_url,
                title: request.title,
                description: request.description,
                favicon_url: request.favicon_url,
                og_image_url: request.og_image_url,
                is_active: request.is_active,
                password_hash,
                expires_at: request.expires_at,
                max_clicks: request.max_clicks,
                utm_source: request.utm_source,
                utm_medium: request.utm_medium,
                utm_campaign: request.utm_campaign,
                utm_term: request.utm_term,
                utm_content: request.utm_content,
                workspace_id: request.workspace_id,
                user_id: request.user_id,
            });
        }

        let links = self.link_repository.bulk_create(new_links).await?;

        for link in &links {
            self.event_bus
                .publish(
                    WebhookEvent::LinkCreated,
                    link.workspace_id,
                    json!({ "link_id": link.id, "short_code": link.short_code }),
                )
                .await;
        }

        Ok(links)
    }

    /// Retrieves a link by its short code. Does not consult C; this is the
    /// Management API path, not the redirect hot path.
    pub async fn get_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "short_code": code })))
    }

    /// Retrieves a link by ID, scoped to a workspace.
    pub async fn get_by_id(&self, id: i64, workspace_id: Uuid) -> Result<Link, AppError> {
        let link = self
            .link_repository
            .find_by_id(id)
            .await?
            .filter(|l| l.workspace_id == workspace_id && !l.is_deleted())
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": id })))?;
        Ok(link)
    }

    /// Lists links for a workspace with pagination, clamping `limit` to
    /// [`MAX_LIST_LIMIT`].
    pub async fn list(
        &self,
        workspace_id: Uuid,
        filter: LinkFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        self.link_repository.list(workspace_id, filter, offset, limit).await
    }

    /// Applies a partial update, invalidating C and publishing `link.updated`.
    pub async fn update(&self, id: i64, workspace_id: Uuid, patch: LinkPatch) -> Result<Link, AppError> {
        if patch.is_noop() {
            return self.get_by_id(id, workspace_id).await;
        }

        let mut patch = patch;
        if let Some(Some(ref plaintext)) = patch.password_hash.clone() {
            patch.password_hash = Some(Some(hash_password(plaintext)?));
        }
        if let Some(ref destination_url) = patch.destination_url {
            let normalized = normalize_url(destination_url)
                .map_err(|e| AppError::bad_request("Invalid destination URL", json!({ "reason": e.to_string() })))?;
            patch.destination_url = Some(normalized);
        }

        let link = self.link_repository.update(id, workspace_id, patch).await?;

        if let Err(e) = self.cache.invalidate(&link.short_code).await {
            tracing::warn!(short_code = %link.short_code, error = %e, "cache invalidation failed after link update");
        }

        self.event_bus
            .publish(
                WebhookEvent::LinkUpdated,
                link.workspace_id,
                json!({ "link_id": link.id, "short_code": link.short_code }),
            )
            .await;

        Ok(link)
    }

    /// Soft-deletes a link, invalidating C and publishing `link.deleted`.
    pub async fn soft_delete(&self, id: i64, workspace_id: Uuid) -> Result<(), AppError> {
        let link = self.get_by_id(id, workspace_id).await?;

        let deleted = self.link_repository.soft_delete(id, workspace_id).await?;
        if !deleted {
            return Err(AppError::not_found("Link not found", json!({ "link_id": id })));
        }

        if let Err(e) = self.cache.invalidate(&link.short_code).await {
            tracing::warn!(short_code = %link.short_code, error = %e, "cache invalidation failed after link delete");
        }

        self.event_bus
            .publish(
                WebhookEvent::LinkDeleted,
                workspace_id,
                json!({ "link_id": id, "short_code": link.short_code }),
            )
            .await;

        Ok(())
    }

    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_GENERATION_ATTEMPTS {
            let code = generate_code(self.shortcode_length);
            if self.link_repository.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(AppError::fatal(
            "Failed to generate a unique short code",
            json!({ "attempts": MAX_CODE_GENERATION_ATTEMPTS }),
        ))
    }
}
