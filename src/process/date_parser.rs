use chrono::{NaiveDate, NaiveDateTime};

/// Parses a wall-clock timestamp with the first matching format → millis
/// since the epoch, reading the value as if it were UTC.
pub fn parse_timestamp_millis(s: &str, formats: &[String]) -> Option<i64> {
    let s = s.trim();
    formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Parses a calendar date → days since 1970-01-01 (Arrow `Date32`).
pub fn parse_date_days(s: &str, format: &str) -> Option<i32> {
    let date = NaiveDate::parse_from_str(s.trim(), format).ok()?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    i32::try_from(date.signed_duration_since(epoch).num_days()).ok()
}
