//! Best-effort conversion of timestamp-ish values into Unix seconds.
//!
//! `0` is the universal "unknown" value: absent, unsupported or unparseable input all
//! map to it, so downstream consumers never deal with nulls.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Anything above this is taken to be milliseconds (~2286-11-20 in seconds).
const MILLIS_THRESHOLD: i128 = 10_000_000_000;

/// Tried in order; all are read as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The representations [`to_unix_timestamp`] understands.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeValue<'a> {
    Missing,
    Json(&'a Value),
    Text(&'a str),
    Int(i128),
    Float(f64),
    /// Wall-clock time without a zone; treated as UTC.
    Naive(NaiveDateTime),
    Instant(DateTime<Utc>),
}

impl<'a> From<&'a Value> for TimeValue<'a> {
    fn from(v: &'a Value) -> Self {
        TimeValue::Json(v)
    }
}

impl<'a> From<Option<&'a Value>> for TimeValue<'a> {
    fn from(v: Option<&'a Value>) -> Self {
        v.map_or(TimeValue::Missing, TimeValue::Json)
    }
}

impl<'a> From<&'a str> for TimeValue<'a> {
    fn from(s: &'a str) -> Self {
        TimeValue::Text(s)
    }
}

impl From<i64> for TimeValue<'_> {
    fn from(v: i64) -> Self {
        TimeValue::Int(v.into())
    }
}

impl From<u64> for TimeValue<'_> {
    fn from(v: u64) -> Self {
        TimeValue::Int(v.into())
    }
}

impl From<f64> for TimeValue<'_> {
    fn from(v: f64) -> Self {
        TimeValue::Float(v)
    }
}

impl From<NaiveDateTime> for TimeValue<'_> {
    fn from(v: NaiveDateTime) -> Self {
        TimeValue::Naive(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimeValue<'_> {
    fn from(v: DateTime<Tz>) -> Self {
        TimeValue::Instant(v.with_timezone(&Utc))
    }
}

/// Convert a value of unknown representation into non-negative Unix seconds.
///
/// ```
/// use serde_json::json;
/// use spotlight_social::instagram::to_unix_timestamp;
///
/// assert_eq!(to_unix_timestamp(1_700_000_000_000u64), 1_700_000_000);
/// assert_eq!(to_unix_timestamp("2023-01-01T00:00:00Z"), 1_672_531_200);
/// assert_eq!(to_unix_timestamp(&json!("1700000000")), 1_700_000_000);
/// assert_eq!(to_unix_timestamp(None::<&serde_json::Value>), 0);
/// ```
pub fn to_unix_timestamp<'a>(value: impl Into<TimeValue<'a>>) -> u64 {
    match value.into() {
        TimeValue::Missing => 0,
        TimeValue::Json(v) => from_json(v),
        TimeValue::Text(s) => from_text(s),
        TimeValue::Int(v) => from_int(v),
        TimeValue::Float(v) => from_float(v),
        TimeValue::Naive(dt) => clamp(dt.and_utc().timestamp().into()),
        TimeValue::Instant(dt) => clamp(dt.timestamp().into()),
    }
}

fn from_json(v: &Value) -> u64 {
    match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                from_int(u.into())
            } else if let Some(i) = n.as_i64() {
                from_int(i.into())
            } else {
                n.as_f64().map_or(0, from_float)
            }
        }
        Value::String(s) => from_text(s),
        // null, booleans and containers carry no usable time
        _ => 0,
    }
}

fn from_int(v: i128) -> u64 {
    if v > MILLIS_THRESHOLD {
        clamp(v / 1000)
    } else {
        clamp(v)
    }
}

fn from_float(v: f64) -> u64 {
    if !v.is_finite() {
        return 0;
    }
    let secs = if v > MILLIS_THRESHOLD as f64 {
        v / 1000.0
    } else {
        v
    };
    if secs <= 0.0 { 0 } else { secs.trunc() as u64 }
}

fn from_text(raw: &str) -> u64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i128>().map_or(0, from_int);
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return clamp(dt.and_utc().timestamp().into());
        }
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(0, |dt| clamp(dt.and_utc().timestamp().into()))
}

fn clamp(v: i128) -> u64 {
    u64::try_from(v.max(0)).unwrap_or(u64::MAX)
}
