//! Timestamp formatting and parsing.
//!
//! Signed requests carry their timestamp in ISO 8601 basic format
//! (`YYYYMMDDTHHMMSSZ`). The signer also accepts a caller-supplied `Date`
//! header in any of the common HTTP / ISO renderings; naive timestamps are
//! interpreted as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// ISO 8601 basic format used by `X-Fidem-Date`.
pub const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Naive date-time layouts accepted after RFC 3339 and RFC 2822 fail.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    DATETIME_FORMAT,
    "%Y%m%dT%H%M%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%B %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%a %b %d %Y %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%B %d, %Y", "%b %d, %Y"];

/// Format a timestamp as `YYYYMMDDTHHMMSSZ`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use fidem_auth::date::format_datetime;
///
/// let ts = Utc.with_ymd_and_hms(2014, 10, 26, 12, 0, 0).unwrap();
/// assert_eq!(format_datetime(&ts), "20141026T120000Z");
/// ```
#[must_use]
pub fn format_datetime(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DATETIME_FORMAT).to_string()
}

/// Reduce a timestamp string to its `YYYYMMDD` date portion.
///
/// Separators (`:` and `-`) and a three-digit fractional second are removed
/// before the first eight characters are taken, so both `20141026T120000Z`
/// and `2014-10-26T12:00:00.000Z` yield `20141026`.
///
/// # Examples
///
/// ```
/// use fidem_auth::date::strip_time;
///
/// assert_eq!(strip_time("20141026T120000Z"), "20141026");
/// assert_eq!(strip_time("2014-10-26T12:00:00.000Z"), "20141026");
/// ```
#[must_use]
pub fn strip_time(datetime: &str) -> String {
    let chars: Vec<char> = datetime.chars().collect();
    let mut compact = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            ':' | '-' => i += 1,
            '.' if chars.len() >= i + 4 && chars[i + 1..i + 4].iter().all(char::is_ascii_digit) => {
                i += 4;
            }
            c => {
                compact.push(c);
                i += 1;
            }
        }
    }
    compact.chars().take(8).collect()
}

/// Parse a timestamp in any of the supported renderings.
///
/// Returns `None` when no layout matches.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(value) {
        return Some(ts.with_timezone(&Utc));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
