//! Fixed-offset timezone identifiers.
//!
//! Subscribers store an identifier of the form `UTC`, `UTC+5`, `UTC-08:00`
//! or `UTC+05:30`. The catalog in the config maps user-facing selection
//! keys to these identifiers; everything downstream resolves them through
//! [`resolve`]. Identifiers that fail to parse fall back to UTC at the
//! call site rather than failing the subscriber.

use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^UTC(?:([+-])(\d{1,2})(?::(\d{2}))?)?$").expect("valid offset regex"));

/// Parse a timezone identifier into a fixed UTC offset.
/// Returns `None` for anything outside the recognized grammar or range.
pub fn resolve(identifier: &str) -> Option<FixedOffset> {
    let caps = OFFSET_RE.captures(identifier.trim())?;
    let Some(sign) = caps.get(1) else {
        return Some(utc());
    };
    let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
    let minutes: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if minutes >= 60 {
        return None;
    }
    let total_secs = (hours * 3600 + minutes * 60) * if sign.as_str() == "-" { -1 } else { 1 };
    FixedOffset::east_opt(total_secs)
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("zero offset is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_utc() {
        assert_eq!(resolve("UTC"), Some(utc()));
    }

    #[test]
    fn resolves_whole_hour_offsets() {
        assert_eq!(resolve("UTC+5"), FixedOffset::east_opt(5 * 3600));
        assert_eq!(resolve("UTC-08:00"), FixedOffset::east_opt(-8 * 3600));
        assert_eq!(resolve("UTC+00:00"), Some(utc()));
    }

    #[test]
    fn resolves_half_hour_offsets() {
        assert_eq!(resolve("UTC+05:30"), FixedOffset::east_opt(5 * 3600 + 1800));
        assert_eq!(resolve("UTC-03:30"), FixedOffset::east_opt(-(3 * 3600 + 1800)));
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert_eq!(resolve("Mars/Olympus"), None);
        assert_eq!(resolve("GMT+1"), None);
        assert_eq!(resolve("UTC+5:7"), None);
        assert_eq!(resolve("UTC+99"), None);
        assert_eq!(resolve(""), None);
    }
}
