use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use regex::Regex;
use serde_json::Value;

pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";

static FORMAT_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("YYYY|MM|DD|HH|mm|ss").expect("valid date token regex"));

/// Interpret an RFC 3339 string, a `YYYY-MM-DD` date or epoch milliseconds
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|d| d.and_utc())
                })
        }
        Value::Number(n) => n
            .as_f64()
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64)),
        _ => None,
    }
}

/// Render `date` with the tokens `YYYY MM DD HH mm ss` (UTC)
pub fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    FORMAT_TOKENS
        .replace_all(format, |caps: &regex::Captures<'_>| match &caps[0] {
            "YYYY" => format!("{:04}", date.year()),
            "MM" => format!("{:02}", date.month()),
            "DD" => format!("{:02}", date.day()),
            "HH" => format!("{:02}", date.hour()),
            "mm" => format!("{:02}", date.minute()),
            "ss" => format!("{:02}", date.second()),
            other => other.to_string(),
        })
        .into_owned()
}

pub fn add_days(date: &DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Absolute number of whole days between two instants
pub fn diff_days(a: &DateTime<Utc>, b: &DateTime<Utc>) -> i64 {
    (*b - *a).num_days().abs()
}

pub fn is_same_day(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

pub fn is_today(date: &DateTime<Utc>) -> bool {
    is_same_day(date, &Utc::now())
}

pub fn is_after(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a > b
}

/// ISO-8601 with millisecond precision, matching `Date.prototype.toISOString`
pub fn to_iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
