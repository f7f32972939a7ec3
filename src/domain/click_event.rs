//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An in-memory representation of a click event, enqueued by the Resolver
/// and drained by the ClickProcessor.
///
/// The Resolver has already resolved the Link (cache hit or store lookup)
/// by the time it enqueues, so this carries `link_id`/`workspace_id`/
/// `short_code`/UTM snapshot directly rather than asking the processor to
/// re-resolve them — avoiding a second store round-trip per click.
///
/// Not individually durable beyond the ClickQueue; all client metadata is
/// optional to handle missing headers gracefully.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub workspace_id: Uuid,
    pub short_code: String,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
}

impl ClickEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        link_id: i64,
        workspace_id: Uuid,
        short_code: String,
        timestamp: DateTime<Utc>,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            workspace_id,
            short_code,
            timestamp,
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_term: None,
            utm_content: None,
        }
    }

    /// Attaches the link's UTM pass-through fields, captured at enqueue time.
    pub fn with_utm(
        mut self,
        utm_source: Option<String>,
        utm_medium: Option<String>,
        utm_campaign: Option<String>,
        utm_term: Option<String>,
        utm_content: Option<String>,
    ) -> Self {
        self.utm_source = utm_source;
        self.utm_medium = utm_medium;
        self.utm_campaign = utm_campaign;
        self.utm_term = utm_term;
        self.utm_content = utm_content;
        self
    }
}
