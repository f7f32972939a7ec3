//! User-agent parsing, IP geolocation, and bot detection for the
//! ClickProcessor pipeline. All lookups are best-effort: failure yields
//! `None` fields, never an error (§4.5).

use crate::domain::entities::DeviceType;

/// Deny-listed UA substrings that mark a click as a bot regardless of
/// woothee's classification (case-insensitive).
const BOT_DENYLIST: &[&str] = &[
    "bot", "spider", "crawler", "curl", "wget", "python-requests", "headlesschrome",
    "pingdom", "monitor", "slurp", "facebookexternalhit",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub device_type: Option<DeviceType>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
}

/// Parses a User-Agent string via `woothee`. Returns `None` fields for an
/// empty or unclassifiable string rather than erroring.
pub fn parse_user_agent(user_agent: &str) -> UserAgentInfo {
    if user_agent.trim().is_empty() {
        return UserAgentInfo::default();
    }
    let Some(result) = woothee::parser::Parser::new().parse(user_agent) else {
        return UserAgentInfo::default();
    };

    let device_type = match result.category {
        "smartphone" => DeviceType::Mobile,
        "mobilephone" => DeviceType::Mobile,
        "tablet" => DeviceType::Tablet,
        "pc" => DeviceType::Desktop,
        "crawler" => DeviceType::Other,
        _ => DeviceType::Other,
    };

    UserAgentInfo {
        device_type: Some(device_type),
        browser: non_empty(result.name),
        browser_version: non_empty(result.version),
        os: non_empty(result.os),
        os_version: non_empty(result.os_version.as_ref()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() || s == "UNKNOWN" {
        None
    } else {
        Some(s.to_string())
    }
}

/// True if the user-agent looks automated: deny-listed substring, or
/// woothee classifying it as a crawler.
pub fn is_bot(user_agent: &str) -> bool {
    let lowered = user_agent.to_ascii_lowercase();
    if BOT_DENYLIST.iter().any(|needle| lowered.contains(needle)) {
        return true;
    }
    woothee::parser::Parser::new()
        .parse(user_agent)
        .is_some_and(|r| r.category == "crawler")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Geolocation lookup against a MaxMind GeoLite2-City database. Absence of
/// a configured database path, an unparseable IP, or a lookup miss are all
/// non-fatal and yield an empty `GeoInfo`.
pub struct GeoLookup {
    reader: Option<maxminddb::Reader<Vec<u8>>>,
}

impl GeoLookup {
    pub fn open(path: Option<&str>) -> Self {
        let reader = path.and_then(|p| match maxminddb::Reader::open_readfile(p) {
            Ok(reader) => Some(reader),
            Err(err) => {
                tracing::warn!(error = %err, path = p, "failed to open geoip database, geo fields will be null");
                None
            }
        });
        Self { reader }
    }

    pub fn disabled() -> Self {
        Self { reader: None }
    }

    pub fn lookup(&self, ip: &str) -> GeoInfo {
        let Some(reader) = &self.reader else {
            return GeoInfo::default();
        };
        let Ok(addr) = ip.parse::<std::net::IpAddr>() else {
            return GeoInfo::default();
        };
        let Ok(record) = reader.lookup::<maxminddb::geoip2::City>(addr) else {
            return GeoInfo::default();
        };
        let Some(city) = record else {
            return GeoInfo::default();
        };

        GeoInfo {
            country: city
                .country
                .and_then(|c| c.iso_code)
                .map(|s| s.to_string()),
            region: city
                .subdivisions
                .and_then(|subs| subs.into_iter().next())
                .and_then(|s| s.iso_code)
                .map(|s| s.to_string()),
            city: city
                .city
                .and_then(|c| c.names)
                .and_then(|names| names.get("en").copied())
                .map(|s| s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_user_agent_yields_defaults() {
        assert_eq!(parse_user_agent(""), UserAgentInfo::default());
    }

    #[test]
    fn denylisted_substring_is_a_bot() {
        assert!(is_bot("Mozilla/5.0 (compatible; Googlebot/2.1)"));
        assert!(is_bot("curl/8.4.0"));
    }

    #[test]
    fn ordinary_browser_is_not_a_bot() {
        assert!(!is_bot(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36"
        ));
    }

    #[test]
    fn disabled_geo_lookup_is_always_empty() {
        let lookup = GeoLookup::disabled();
        assert_eq!(lookup.lookup("8.8.8.8"), GeoInfo::default());
    }

    #[test]
    fn unparseable_ip_is_empty() {
        let lookup = GeoLookup::disabled();
        assert_eq!(lookup.lookup("not-an-ip"), GeoInfo::default());
    }
}
