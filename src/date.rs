//! Epoch helpers: date/time split, hour-of-day and whole-day differences.

use time::{Date, OffsetDateTime, Time};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

time::serde::format_description!(pub ymd, Date, "[year]-[month]-[day]");
time::serde::format_description!(pub hms, Time, "[hour]:[minute]:[second]");

/// UTC datetime for fractional epoch seconds; out-of-range values clamp to the epoch.
pub fn datetime_from_epoch(ts: f64) -> OffsetDateTime {
    let secs = if ts.is_finite() { ts.floor() as i64 } else { 0 };
    OffsetDateTime::from_unix_timestamp(secs).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Split an epoch timestamp into its UTC calendar date and time of day (whole seconds).
pub fn split_epoch(ts: f64) -> (Date, Time) {
    let dt = datetime_from_epoch(ts);
    (dt.date(), dt.time())
}

#[inline]
pub fn hour_of(t: Time) -> u8 {
    t.hour()
}

/// Whole days elapsed from `then` to `now` (floored, never negative).
pub fn whole_days_between(now: f64, then: f64) -> i64 {
    let days = ((now - then) / SECONDS_PER_DAY).floor();
    if days.is_finite() && days > 0.0 { days as i64 } else { 0 }
}

/// Current wall clock as fractional epoch seconds.
pub fn now_epoch() -> f64 {
    let now = OffsetDateTime::now_utc();
    now.unix_timestamp() as f64 + f64::from(now.nanosecond()) / 1e9
}
