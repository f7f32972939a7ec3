//! Click entity representing a single persisted redirect event.

use chrono::{DateTime, Utc};

/// The device category a click's user-agent was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
    Other,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Other => "other",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A click row as written to the analytics store by the ClickProcessor.
///
/// `visitor_id` is a 64-char hex fingerprint over `(ip, user_agent, link_id,
/// day_bucket)`, used to deduplicate unique visitors per link per UTC day.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub visitor_id: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,

    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,

    pub device_type: Option<DeviceType>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub is_bot: bool,

    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
}

/// Input to persist a click. Produced by the ClickProcessor after enrichment.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub visitor_id: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub device_type: Option<DeviceType>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub is_bot: bool,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_roundtrips_through_str() {
        for dt in [
            DeviceType::Desktop,
            DeviceType::Mobile,
            DeviceType::Tablet,
            DeviceType::Other,
        ] {
            assert!(!dt.as_str().is_empty());
            assert_eq!(dt.to_string(), dt.as_str());
        }
    }

    #[test]
    fn new_click_carries_enrichment_fields() {
        let new_click = NewClick {
            link_id: 99,
            visitor_id: "a".repeat(64),
            clicked_at: Utc::now(),
            user_agent: Some("Chrome/120".to_string()),
            referer: None,
            ip: Some("10.0.0.1".to_string()),
            country: Some("US".to_string()),
            region: None,
            city: None,
            device_type: Some(DeviceType::Desktop),
            browser: Some("Chrome".to_string()),
            browser_version: Some("120".to_string()),
            os: Some("Windows".to_string()),
            os_version: None,
            is_bot: false,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_term: None,
            utm_content: None,
        };

        assert_eq!(new_click.visitor_id.len(), 64);
        assert!(!new_click.is_bot);
    }
}
