//! Calendar helpers for local-day arithmetic.
//!
//! Every analytic takes `now` as a `DateTime<Tz>`; the time zone carried by
//! `now` is the one that defines calendar days and weeks.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Calendar date of `instant` as seen in `tz`
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Inclusive Monday..=Sunday date range of the week containing `now`
pub fn current_week<Tz: TimeZone>(now: &DateTime<Tz>) -> (NaiveDate, NaiveDate) {
    let monday = week_start(now.date_naive());
    (monday, monday + Duration::days(6))
}

/// Start of a trailing window of `days` ending at `now`
///
/// Windows reaching past the representable range start at the earliest instant.
pub fn trailing_since<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| now.with_timezone(&Utc).checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether `instant` lies in `[now - days, now]`
pub fn within_trailing_days<Tz: TimeZone>(
    instant: &DateTime<Utc>,
    days: u32,
    now: &DateTime<Tz>,
) -> bool {
    let end = now.with_timezone(&Utc);
    *instant >= trailing_since(now, days) && *instant <= end
}
