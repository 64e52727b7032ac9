use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc};

/// Dedup bucket for a sunny alert: the forecast hour, not the send time.
pub fn hour_bucket_key(forecast_time: &DateTime<Utc>) -> String {
    forecast_time.format("%Y-%m-%d %H:00").to_string()
}

/// Dedup bucket for once-a-day alerts.
pub fn day_bucket_key(kind: &str, date: NaiveDate) -> String {
    format!("{kind}@{}", date.format("%Y-%m-%d"))
}

/// `HH:MM` of `time` in the given zone.
pub fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M").to_string()
}

/// Offset the scheduler uses for fixed clock triggers. Hours outside the
/// valid range fall back to UTC.
pub fn alert_offset(offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Local date and minute-truncated clock time of `now` at `offset`.
pub fn local_clock(now: DateTime<Utc>, offset: FixedOffset) -> (NaiveDate, NaiveTime) {
    let local = now.with_timezone(&offset);
    let time = local
        .time()
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or_else(|| local.time());
    (local.date_naive(), time)
}
