//! Midnight rollover.
//!
//! Elapsed time is counted per calendar day in local time. When the last
//! update predates today's midnight, the working total starts over.

use chrono::{Duration, Local, LocalResult, TimeZone};

/// Epoch ms of midnight on the local calendar day containing `now_ms`.
pub fn local_midnight_ms(now_ms: i64) -> i64 {
    midnight_ms_in(&Local, now_ms)
}

/// Epoch ms of midnight on the calendar day (in `tz`) containing `now_ms`.
///
/// Where midnight does not exist (a DST gap) the earliest valid time of the
/// day is used instead.
pub fn midnight_ms_in<Tz: TimeZone>(tz: &Tz, now_ms: i64) -> i64 {
    let Some(now) = tz.timestamp_millis_opt(now_ms).earliest() else {
        return now_ms;
    };
    let Some(midnight) = now.date_naive().and_hms_opt(0, 0, 0) else {
        return now_ms;
    };

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        LocalResult::None => (1..=96)
            .find_map(|quarter| {
                tz.from_local_datetime(&(midnight + Duration::minutes(15 * quarter)))
                    .earliest()
            })
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(now_ms),
    }
}

/// Reset `total_ms` when `last_update_ms` falls before the midnight that
/// starts the day of `now_ms`. Returns whether a reset happened.
///
/// Calling it again with the same `now_ms` is a no-op, since `last_update_ms`
/// is moved to `now_ms`.
pub fn apply_rollover_in<Tz: TimeZone>(
    tz: &Tz,
    total_ms: &mut u64,
    last_update_ms: &mut i64,
    now_ms: i64,
) -> bool {
    if *last_update_ms < midnight_ms_in(tz, now_ms) {
        *total_ms = 0;
        *last_update_ms = now_ms;
        true
    } else {
        false
    }
}

pub fn apply_rollover(total_ms: &mut u64, last_update_ms: &mut i64, now_ms: i64) -> bool {
    apply_rollover_in(&Local, total_ms, last_update_ms, now_ms)
}
