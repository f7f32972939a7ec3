//! Bearer API-key authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use chrono::Utc;

use crate::{error::AppError, state::AppState};

/// Authenticates requests using Bearer API keys from the `Authorization` header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer lr_<...>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract the raw key from the `Authorization` header.
/// 2. Look it up by its clear-text prefix, then verify the full key's HMAC.
/// 3. Reject revoked or expired keys.
/// 4. Record `last_used_at` and insert the resolved [`ApiKey`] into request
///    extensions so handlers can read `key.workspace_id` and call
///    `state.api_key_service.authorize(&key, scope)`.
///
/// [`ApiKey`]: crate::domain::entities::ApiKey
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing, malformed, or the key
/// does not authenticate. Adds `WWW-Authenticate: Bearer` per RFC 6750 (via
/// [`AppError`]'s `IntoResponse` impl).
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(raw_key) = AuthBearer::from_request_parts(&mut parts, &()).await.map_err(|_| {
        AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "Authorization header is missing or invalid"}),
        )
    })?;

    let key = st.api_key_service.authenticate(&raw_key, Utc::now()).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(key);

    Ok(next.run(req).await)
}
