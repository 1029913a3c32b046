//! Constants and helpers shared across IOC objects.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

// ============================================================================
// OpenIOC Namespaces
// ============================================================================

/// OpenIOC 1.0 namespace; every recognized element is qualified by it.
pub const XMLNS_IOC: &str = "http://schemas.mandiant.com/2010/ioc";

// ============================================================================
// Timestamps
// ============================================================================

/// Parses an OpenIOC timestamp.
///
/// OpenIOC authoring tools write `xs:dateTime` values, usually without a
/// timezone. Naive values are taken as UTC, and a bare date is taken as
/// midnight UTC. Returns `None` for anything else.
pub fn parse_ioc_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let naive_formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in naive_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}
