//! Resolver (R): the redirect hot path. Cache-then-store lookup, fixed-order
//! policy evaluation, non-blocking click enqueue.

use std::sync::Arc;

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use tokio::sync::mpsc;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an unlock token issued after a correct password submission.
const UNLOCK_TOKEN_TTL_SECS: i64 = 60;

/// Resolver (R): looks up a link, applies policy in a fixed order, and
/// enqueues a [`ClickEvent`] for the ClickProcessor without blocking the
/// caller. C's absence or failure never changes the outcome here, only
/// latency: a cache miss or cache error both fall through to the store.
pub struct ResolverService<L: LinkRepository, C: CacheService> {
    link_repository: Arc<L>,
    cache: Arc<C>,
    click_sender: mpsc::Sender<ClickEvent>,
    cache_ttl_seconds: usize,
    unlock_token_secret: String,
}

impl<L: LinkRepository, C: CacheService> ResolverService<L, C> {
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<C>,
        click_sender: mpsc::Sender<ClickEvent>,
        cache_ttl_seconds: usize,
        unlock_token_secret: String,
    ) -> Self {
        Self {
            link_repository,
            cache,
            click_sender,
            cache_ttl_seconds,
            unlock_token_secret,
        }
    }

    async fn resolve_link(&self, code: &str) -> Result<Link, AppError> {
        if let Ok(Some(link)) = self.cache.get_link(code).await {
            return Ok(link);
        }

        let link = self
            .link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "short_code": code })))?;

        if let Err(e) = self.cache.put_link(code, &link, Some(self.cache_ttl_seconds)).await {
            tracing::warn!(short_code = code, error = %e, "cache write failed, continuing without it");
        }

        Ok(link)
    }

    /// Resolves `code` against policy and enqueues a click event on success.
    ///
    /// Policy order: not-found/inactive, expired, click-limited,
    /// password-protected. Each gate short-circuits before the next.
    #[allow(clippy::too_many_arguments)]
    pub async fn resolve(
        &self,
        code: &str,
        now: DateTime<Utc>,
        unlock_token: Option<&str>,
        ip: Option<&str>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Result<Link, AppError> {
        let link = self.resolve_link(code).await?;

        if link.is_deleted() || !link.is_active {
            return Err(AppError::not_found("Short link not found", json!({ "short_code": code })));
        }

        if link.is_expired(now) {
            return Err(AppError::gone("This link has expired", json!({ "short_code": code })));
        }

        if link.is_click_limited() {
            return Err(AppError::gone(
                "This link has reached its click limit",
                json!({ "short_code": code }),
            ));
        }

        if link.is_password_protected() {
            let unlocked = unlock_token.is_some_and(|token| self.verify_unlock_token(&link, token, now));
            if !unlocked {
                return Err(AppError::unauthorized(
                    "This link is password protected",
                    json!({ "short_code": code, "challenge": "password" }),
                ));
            }
        }

        let event = ClickEvent::new(link.id, link.workspace_id, link.short_code.clone(), now, ip.map(String::from), user_agent, referer)
            .with_utm(
                link.utm_source.clone(),
                link.utm_medium.clone(),
                link.utm_campaign.clone(),
                link.utm_term.clone(),
                link.utm_content.clone(),
            );

        if let Err(e) = self.click_sender.try_send(event) {
            metrics::counter!("click_queue_drops_total").increment(1);
            tracing::warn!(short_code = code, error = %e, "click queue full, dropping click");
        }

        Ok(link)
    }

    /// Verifies `password` against a password-protected link and, on
    /// success, issues a short-lived unlock token for a follow-up `resolve`.
    pub async fn unlock(&self, code: &str, password: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let link = self.resolve_link(code).await?;

        let hash = link
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::bad_request("This link is not password protected", json!({ "short_code": code })))?;

        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::fatal("stored password hash is malformed", json!({ "error": e.to_string() })))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::unauthorized("Incorrect password", json!({ "short_code": code })))?;

        Ok(self.issue_unlock_token(link.id, now))
    }

    fn issue_unlock_token(&self, link_id: i64, now: DateTime<Utc>) -> String {
        let expires_at = now.timestamp() + UNLOCK_TOKEN_TTL_SECS;
        let payload = format!("{link_id}:{expires_at}");
        let mac = self.sign(&payload);
        let token = format!("{payload}:{mac}");
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token)
    }

    fn verify_unlock_token(&self, link: &Link, token: &str, now: DateTime<Utc>) -> bool {
        let Ok(decoded) = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(token) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };

        let mut parts = decoded.splitn(3, ':');
        let (Some(link_id_part), Some(expires_at_part), Some(mac_part)) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };

        let Ok(token_link_id) = link_id_part.parse::<i64>() else {
            return false;
        };
        let Ok(expires_at) = expires_at_part.parse::<i64>() else {
            return false;
        };

        if token_link_id != link.id || now.timestamp() > expires_at {
            return false;
        }

        let payload = format!("{token_link_id}:{expires_at}");
        self.sign(&payload) == mac_part
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.unlock_token_secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
