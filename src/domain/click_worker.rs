//! ClickProcessor (P): drains the ClickQueue, enriches, persists, updates
//! counters and broadcasts, per §4.5.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use uuid::Uuid;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{DeviceType, NewClick, WebhookEvent};
use crate::domain::enrichment::{GeoLookup, is_bot, parse_user_agent};
use crate::domain::event_bus::EventBus;
use crate::domain::fingerprint::visitor_id;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// Real-time notification published to SSE/WebSocket consumers after a
/// non-bot click is persisted.
#[derive(Debug, Clone)]
pub struct ClickNotification {
    pub link_id: i64,
    pub workspace_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub country: Option<String>,
    pub device_type: Option<DeviceType>,
    pub browser: Option<String>,
    pub referer: Option<String>,
}

/// Returns `true` for transient errors worth retrying (DB connection issues,
/// timeouts). Validation/not-found/fatal errors are not retried.
fn is_transient_error(e: &AppError) -> bool {
    matches!(e, AppError::Transient { .. })
}

/// Processes one click event: bot detection, fingerprinting, enrichment,
/// persist-with-retry, counters, broadcast, event emission.
async fn process_click<C, L, EB>(
    event: ClickEvent,
    click_repo: Arc<C>,
    link_repo: Arc<L>,
    event_bus: Arc<EB>,
    geo: Arc<GeoLookup>,
    broadcaster: broadcast::Sender<ClickNotification>,
) where
    C: ClickRepository,
    L: LinkRepository,
    EB: EventBus,
{
    let ua_info = event.user_agent.as_deref().map(parse_user_agent);
    let bot = is_bot(event.user_agent.as_deref().unwrap_or(""));
    let geo_info = geo.lookup(event.ip.as_deref().unwrap_or(""));
    let fingerprint = visitor_id(event.ip.as_deref(), event.user_agent.as_deref(), event.link_id, event.timestamp);

    // Must run before `record` below: the dedup query matches on
    // `(link_id, visitor_id, clicked_at::date)`, so checking after the
    // insert would always see today's own row and report a repeat visit.
    let already_visited_today = click_repo
        .has_visited_today(event.link_id, &fingerprint, event.timestamp)
        .await;

    let new_click = NewClick {
        link_id: event.link_id,
        visitor_id: fingerprint.clone(),
        clicked_at: event.timestamp,
        user_agent: event.user_agent.clone(),
        referer: event.referer.clone(),
        ip: event.ip.clone(),
        country: geo_info.country,
        region: geo_info.region,
        city: geo_info.city,
        device_type: ua_info.as_ref().and_then(|i| i.device_type),
        browser: ua_info.as_ref().and_then(|i| i.browser.clone()),
        browser_version: ua_info.as_ref().and_then(|i| i.browser_version.clone()),
        os: ua_info.as_ref().and_then(|i| i.os.clone()),
        os_version: ua_info.as_ref().and_then(|i| i.os_version.clone()),
        is_bot: bot,
        utm_source: event.utm_source.clone(),
        utm_medium: event.utm_medium.clone(),
        utm_campaign: event.utm_campaign.clone(),
        utm_term: event.utm_term.clone(),
        utm_content: event.utm_content.clone(),
    };

    let strategy = ExponentialBackoff::from_millis(100).take(5);
    let repo = click_repo.clone();
    let nc = new_click.clone();

    let op = || {
        let repo = repo.clone();
        let nc = nc.clone();
        async move { repo.record(nc).await }
    };

    let ev = event.clone();
    let on_error = |e: &AppError| {
        let transient = is_transient_error(e);
        if transient {
            metrics::counter!("click_worker_retried_total").increment(1);
            tracing::warn!(link_id = ev.link_id, error = ?e, "click worker: transient error, retrying");
        }
        transient
    };

    let persisted = match RetryIf::spawn(strategy, op, on_error).await {
        Ok(click) => {
            metrics::counter!("click_worker_processed_total").increment(1);
            click
        }
        Err(e) => {
            metrics::counter!("click_worker_dead_lettered_total").increment(1);
            tracing::error!(
                target: "click_dead_letter",
                link_id = event.link_id,
                workspace_id = %event.workspace_id,
                visitor_id = %fingerprint,
                error = ?e,
                "click dead-lettered after exhausting retries"
            );
            return;
        }
    };

    if bot {
        return;
    }

    if let Err(e) = link_repo.increment_clicks(event.link_id).await {
        tracing::error!(link_id = event.link_id, error = ?e, "failed to increment total_clicks");
    }

    match already_visited_today {
        Ok(false) => {
            if let Err(e) = link_repo.increment_unique_clicks(event.link_id).await {
                tracing::error!(link_id = event.link_id, error = ?e, "failed to increment unique_clicks");
            }
        }
        Ok(true) => {}
        Err(e) => tracing::warn!(link_id = event.link_id, error = ?e, "unique-click dedup check failed, skipping"),
    }

    let notification = ClickNotification {
        link_id: event.link_id,
        workspace_id: event.workspace_id,
        timestamp: event.timestamp,
        country: persisted.country.clone(),
        device_type: persisted.device_type,
        browser: persisted.browser.clone(),
        referer: event.referer.clone(),
    };
    let _ = broadcaster.send(notification);

    event_bus
        .publish(
            WebhookEvent::LinkClicked,
            event.workspace_id,
            json!({
                "link_id": event.link_id,
                "short_code": event.short_code,
                "country": persisted.country,
                "device_type": persisted.device_type.map(|d| d.as_str()),
                "browser": persisted.browser,
                "referer": event.referer,
                "is_bot": persisted.is_bot,
            }),
        )
        .await;
}

/// Runs the ClickProcessor with bounded worker concurrency.
///
/// Exits when the sending side of `rx` is dropped. Before returning, all
/// in-flight tasks are drained so no events are lost on shutdown.
pub async fn run_click_worker<C, L, EB>(
    mut rx: mpsc::Receiver<ClickEvent>,
    click_repo: Arc<C>,
    link_repo: Arc<L>,
    event_bus: Arc<EB>,
    geo: Arc<GeoLookup>,
    broadcaster: broadcast::Sender<ClickNotification>,
    concurrency: usize,
) where
    C: ClickRepository + 'static,
    L: LinkRepository + 'static,
    EB: EventBus + 'static,
{
    tracing::info!(concurrency, "click worker started");

    let mut join_set: JoinSet<()> = JoinSet::new();

    while let Some(ev) = rx.recv().await {
        metrics::counter!("click_worker_received_total").increment(1);

        while join_set.try_join_next().is_some() {}

        if join_set.len() >= concurrency {
            join_set.join_next().await;
        }

        let click_repo = click_repo.clone();
        let link_repo = link_repo.clone();
        let event_bus = event_bus.clone();
        let geo = geo.clone();
        let broadcaster = broadcaster.clone();

        join_set.spawn(async move {
            process_click(ev, click_repo, link_repo, event_bus, geo, broadcaster).await;
        });
    }

    while join_set.join_next().await.is_some() {}

    tracing::info!("click worker stopped");
}
