//! Visitor fingerprinting and day-bucket unique-click accounting.
//!
//! Unique-visitor bucketing is calendar-day UTC (see `DESIGN.md`, resolving
//! spec.md's Open Question in favor of the simpler, fully deterministic
//! choice over a sliding 24h window).

use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};

/// The UTC calendar date portion of a timestamp.
pub fn day_bucket(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// `visitor_id = hash(ip || user_agent || link_id || day_bucket)`, a 64-char
/// lowercase hex fingerprint. Same inputs always yield the same fingerprint,
/// which is what makes `IncrementUniqueClicks` idempotent per
/// `(link_id, visitor_id, day_bucket)`.
pub fn visitor_id(ip: Option<&str>, user_agent: Option<&str>, link_id: i64, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(link_id.to_le_bytes());
    hasher.update(b"|");
    hasher.update(day_bucket(at).to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fingerprint_is_64_hex_chars() {
        let id = visitor_id(Some("1.2.3.4"), Some("UA"), 1, Utc::now());
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_inputs_same_day_are_idempotent() {
        let now = Utc::now();
        let a = visitor_id(Some("1.2.3.4"), Some("UA"), 42, now);
        let b = visitor_id(Some("1.2.3.4"), Some("UA"), 42, now + Duration::minutes(5));
        assert_eq!(a, b);
    }

    #[test]
    fn different_days_are_different_buckets() {
        let now = Utc::now();
        let a = visitor_id(Some("1.2.3.4"), Some("UA"), 42, now);
        let b = visitor_id(Some("1.2.3.4"), Some("UA"), 42, now + Duration::days(1));
        assert_ne!(a, b);
    }

    #[test]
    fn different_links_are_different_visitors() {
        let now = Utc::now();
        let a = visitor_id(Some("1.2.3.4"), Some("UA"), 1, now);
        let b = visitor_id(Some("1.2.3.4"), Some("UA"), 2, now);
        assert_ne!(a, b);
    }
}
