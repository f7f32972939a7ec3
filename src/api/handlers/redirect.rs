//! Handler for the public redirect host.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use serde::Deserialize;

use crate::config::RedirectStatus;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UnlockQuery {
    token: Option<String>,
}

/// `GET /{code}`
///
/// Resolves a short code against policy (active, not expired, not
/// click-limited, not password-protected without a valid unlock token),
/// enqueues a click event, and redirects to the destination URL.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<UnlockQuery>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let user_agent = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok());
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());
    let ip = addr.ip().to_string();

    let link = state
        .resolver_service
        .resolve(&code, Utc::now(), query.token.as_deref(), Some(&ip), user_agent, referer)
        .await?;

    match state.config.redirect_default_status {
        RedirectStatus::Permanent => Ok(Redirect::permanent(&link.destination_url)),
        RedirectStatus::Temporary => Ok(Redirect::temporary(&link.destination_url)),
    }
}
