//! Management API credential issuance and authentication.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::entities::{ApiKey, ApiKeyScope, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const KEY_PREFIX_LEN: usize = 12;

fn generate_raw_key() -> String {
    let mut buffer = [0u8; 24];
    getrandom::fill(&mut buffer).expect("failed to generate API key");
    format!("lr_{}", hex::encode(buffer))
}

/// Issues, authenticates, and revokes Management API credentials. Raw keys
/// are never persisted: only an HMAC-SHA256 digest and a clear-text lookup
/// prefix are stored, mirroring how bcrypt-free token auth is usually done
/// when the secret itself must stay comparable in constant time.
pub struct ApiKeyService<R: ApiKeyRepository> {
    api_key_repository: Arc<R>,
    signing_secret: String,
}

impl<R: ApiKeyRepository> ApiKeyService<R> {
    pub fn new(api_key_repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            api_key_repository,
            signing_secret,
        }
    }

    fn hash_key(&self, raw_key: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(raw_key.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Creates a new key for a workspace. Returns the persisted record
    /// alongside the raw key, which is shown to the caller exactly once.
    pub async fn issue(
        &self,
        workspace_id: Uuid,
        name: String,
        scopes: Vec<ApiKeyScope>,
        expires_at: Option<DateTime<Utc>>,
        rate_limit_override: Option<i32>,
    ) -> Result<(ApiKey, String), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("API key name must not be empty", json!({})));
        }
        if scopes.is_empty() {
            return Err(AppError::bad_request("API key must have at least one scope", json!({})));
        }

        let raw_key = generate_raw_key();
        let key_prefix = raw_key.chars().take(KEY_PREFIX_LEN).collect::<String>();
        let key_hash = self.hash_key(&raw_key);

        let key = self
            .api_key_repository
            .create(NewApiKey {
                workspace_id,
                name,
                key_prefix,
                key_hash,
                scopes,
                expires_at,
                rate_limit_override,
            })
            .await?;

        Ok((key, raw_key))
    }

    /// Authenticates a raw key presented on an incoming request, touching
    /// `last_used_at` on success.
    pub async fn authenticate(&self, raw_key: &str, now: DateTime<Utc>) -> Result<ApiKey, AppError> {
        if raw_key.len() < KEY_PREFIX_LEN {
            return Err(AppError::unauthorized("Invalid API key", json!({})));
        }
        let key_prefix = &raw_key[..KEY_PREFIX_LEN];

        let key = self
            .api_key_repository
            .find_by_prefix(key_prefix)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid API key", json!({})))?;

        if self.hash_key(raw_key) != key.key_hash {
            return Err(AppError::unauthorized("Invalid API key", json!({})));
        }

        if !key.is_valid(now) {
            return Err(AppError::unauthorized("API key is revoked or expired", json!({})));
        }

        if let Err(e) = self.api_key_repository.touch_last_used(key.id, now).await {
            tracing::warn!(key_id = %key.id, error = %e, "failed to record API key usage");
        }

        Ok(key)
    }

    /// Returns `Forbidden` unless `key` carries `scope`.
    pub fn authorize(&self, key: &ApiKey, scope: ApiKeyScope) -> Result<(), AppError> {
        if key.has_scope(scope) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "API key lacks the required scope",
                json!({ "required_scope": scope.as_str() }),
            ))
        }
    }

    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<ApiKey>, AppError> {
        self.api_key_repository.list(workspace_id).await
    }

    pub async fn revoke(&self, id: Uuid, workspace_id: Uuid) -> Result<(), AppError> {
        let revoked = self.api_key_repository.revoke(id, workspace_id).await?;
        if !revoked {
            return Err(AppError::not_found("API key not found", json!({ "key_id": id })));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockApiKeyRepository;

    fn sample_key(workspace_id: Uuid, key_hash: String) -> ApiKey {
        ApiKey {
            id: Uuid::new_v4(),
            workspace_id,
            name: "ci".to_string(),
            key_prefix: "lr_abcd1234".to_string(),
            key_hash,
            scopes: vec![ApiKeyScope::LinksRead],
            expires_at: None,
            rate_limit_override: None,
            last_used_at: None,
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn issue_rejects_empty_scopes() {
        let repo = MockApiKeyRepository::new();
        let service = ApiKeyService::new(Arc::new(repo), "secret".to_string());
        let result = service.issue(Uuid::new_v4(), "ci".to_string(), vec![], None, None).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn issue_returns_raw_key_once() {
        let workspace_id = Uuid::new_v4();
        let mut repo = MockApiKeyRepository::new();
        repo.expect_create()
            .returning(move |new_key| Ok(sample_key(workspace_id, new_key.key_hash)));

        let service = ApiKeyService::new(Arc::new(repo), "secret".to_string());
        let (key, raw_key) = service
            .issue(workspace_id, "ci".to_string(), vec![ApiKeyScope::LinksRead], None, None)
            .await
            .unwrap();

        assert!(raw_key.starts_with("lr_"));
        assert_eq!(key.key_prefix.len(), KEY_PREFIX_LEN);
    }

    #[tokio::test]
    async fn authenticate_accepts_matching_raw_key() {
        let workspace_id = Uuid::new_v4();
        let service_secret = "secret".to_string();

        let mut mac = HmacSha256::new_from_slice(service_secret.as_bytes()).unwrap();
        let raw_key = "lr_abcd1234deadbeef";
        mac.update(raw_key.as_bytes());
        let key_hash = hex::encode(mac.finalize().into_bytes());

        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_prefix()
            .returning(move |_| Ok(Some(sample_key(workspace_id, key_hash.clone()))));
        repo.expect_touch_last_used().returning(|_, _| Ok(()));

        let service = ApiKeyService::new(Arc::new(repo), service_secret);
        let key = service.authenticate(raw_key, Utc::now()).await.unwrap();
        assert_eq!(key.workspace_id, workspace_id);
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_key() {
        let workspace_id = Uuid::new_v4();
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_prefix()
            .returning(move |_| Ok(Some(sample_key(workspace_id, "somehash".to_string()))));

        let service = ApiKeyService::new(Arc::new(repo), "secret".to_string());
        let result = service.authenticate("lr_abcd1234wrongkey", Utc::now()).await;
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn authorize_checks_scope() {
        let repo = MockApiKeyRepository::new();
        let service = ApiKeyService::new(Arc::new(repo), "secret".to_string());
        let key = sample_key(Uuid::new_v4(), "hash".to_string());

        assert!(service.authorize(&key, ApiKeyScope::LinksRead).is_ok());
        assert!(matches!(
            service.authorize(&key, ApiKeyScope::LinksWrite),
            Err(AppError::Forbidden { .. })
        ));
    }
}
