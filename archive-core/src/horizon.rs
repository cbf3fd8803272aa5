//! Pure calendar arithmetic for purge horizons and the monthly catch-up rule.
//!
//! Kept free of any SQL or filesystem dependency so it can be exercised with
//! plain unit tests.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};

use crate::config::Granularity;

/// The newest timestamp (inclusive) at which a record becomes eligible for
/// archive/delete, given the current time and a retention window.
pub fn compute_horizon(now: i64, granularity: Granularity, retention: u32) -> i64 {
    let now_dt = from_unix(now);
    let shifted = match granularity {
        Granularity::Hours => now_dt - chrono::Duration::hours(retention as i64),
        Granularity::Days => now_dt - chrono::Duration::days(retention as i64),
        Granularity::Months => now_dt
            .checked_sub_months(Months::new(retention))
            .unwrap_or(now_dt),
        Granularity::Years => now_dt
            .checked_sub_months(Months::new(retention.saturating_mul(12)))
            .unwrap_or(now_dt),
    };
    shifted.timestamp()
}

/// First instant (00:00:00 UTC) of the calendar month following `ts`.
pub fn first_instant_of_next_month(ts: i64) -> i64 {
    let dt = from_unix(ts);
    let (year, month) = if dt.month() == 12 {
        (dt.year() + 1, 1)
    } else {
        (dt.year(), dt.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("valid first-of-month date")
        .timestamp()
}

fn from_unix(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().expect("epoch is valid"))
}
