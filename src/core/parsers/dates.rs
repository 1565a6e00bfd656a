// feedsniff - core/parsers/dates.rs
//
// Best-effort date parsing for feed timestamps.
//
// Feeds in the wild use RFC 822/2822 (RSS), RFC 3339 (Atom, JSON Feed) and
// a long tail of near-misses. Candidates are tried from most precise to
// least precise; the first successful parse wins. Never returns an error:
// an unparseable date simply yields `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a feed date string into UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // Tier 1: RFC 3339 / ISO 8601 with explicit offset.
    //   2024-01-15T14:30:22Z, 2024-01-15T14:30:22.123+05:30
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Tier 2: RFC 2822, including obsolete zone names (GMT, UT, EST, ...).
    //   Mon, 15 Jan 2024 14:30:22 GMT, 15 Jan 2024 14:30:22 +0000
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Tier 3: RFC 2822 with a full or misspelled weekday name. The weekday
    // carries no information, so drop everything up to the first comma.
    //   Monday, 15 Jan 2024 14:30:22 GMT
    if let Some((_, rest)) = s.split_once(',') {
        if let Ok(dt) = DateTime::parse_from_rfc2822(rest.trim()) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Tier 4: ISO 8601 offset without a colon.
    //   2024-01-15T14:30:22+0530
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Tier 5: ISO 8601 without any zone; assumed UTC.
    //   2024-01-15T14:30:22, 2024-01-15 14:30:22.5
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }

    // Tier 6: date only; midnight UTC.
    //   2024-01-15
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_date("2024-01-15T14:30:22Z"),
            Some(utc(2024, 1, 15, 14, 30, 22))
        );
        assert_eq!(
            parse_date("2024-01-15T20:00:22+05:30"),
            Some(utc(2024, 1, 15, 14, 30, 22))
        );
    }

    #[test]
    fn test_rfc2822_variants() {
        let expected = Some(utc(2024, 1, 15, 14, 30, 22));
        assert_eq!(parse_date("Mon, 15 Jan 2024 14:30:22 GMT"), expected);
        assert_eq!(parse_date("Mon, 15 Jan 2024 14:30:22 +0000"), expected);
        assert_eq!(parse_date("  15 Jan 2024 14:30:22 +0000 "), expected);
        assert_eq!(parse_date("Monday, 15 Jan 2024 14:30:22 GMT"), expected);
        assert_eq!(
            parse_date("Mon, 15 Jan 2024 09:30:22 EST"),
            expected,
            "EST is UTC-5"
        );
    }

    #[test]
    fn test_offset_without_colon() {
        assert_eq!(
            parse_date("2024-01-15T20:00:22+0530"),
            Some(utc(2024, 1, 15, 14, 30, 22))
        );
    }

    #[test]
    fn test_naive_and_date_only_assume_utc() {
        assert_eq!(
            parse_date("2024-01-15T14:30:22"),
            Some(utc(2024, 1, 15, 14, 30, 22))
        );
        assert_eq!(parse_date("2024-01-15"), Some(utc(2024, 1, 15, 0, 0, 0)));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("32 Foo 2024"), None);
    }
}
