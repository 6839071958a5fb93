//! Shift work-time arithmetic (minutes)

use chrono::{NaiveTime, Timelike};

/// Scheduled length when the employee has no shift template
pub const DEFAULT_SCHEDULED_MINUTES: i64 = 8 * 60;

const MINUTES_PER_DAY: i64 = 24 * 60;

fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// Length of a shift; `end <= start` wraps past midnight
pub fn scheduled_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let (s, e) = (minute_of_day(start), minute_of_day(end));
    if e > s { e - s } else { e + MINUTES_PER_DAY - s }
}

/// `max(0, worked − scheduled)`
pub fn overtime_minutes(worked_minutes: i64, scheduled_minutes: i64) -> i64 {
    (worked_minutes - scheduled_minutes).max(0)
}

pub fn overtime_hours(worked_minutes: i64, scheduled_minutes: i64) -> f64 {
    overtime_minutes(worked_minutes, scheduled_minutes) as f64 / 60.0
}

/// Minutes after `shift_start + grace`, or 0
///
/// Clock-ins up to 12 hours before the shift start count as early, so an
/// employee arriving at 21:50 for a 22:00 shift is not 23 hours late.
pub fn late_minutes(clock_in: NaiveTime, shift_start: NaiveTime, grace_minutes: i64) -> i64 {
    let mut diff = minute_of_day(clock_in) - minute_of_day(shift_start);
    if diff < -MINUTES_PER_DAY / 2 {
        diff += MINUTES_PER_DAY;
    } else if diff > MINUTES_PER_DAY / 2 {
        diff -= MINUTES_PER_DAY;
    }
    (diff - grace_minutes.max(0)).max(0)
}

/// Whole minutes between two Unix millis timestamps
pub fn minutes_between(from_millis: i64, to_millis: i64) -> i64 {
    ((to_millis - from_millis) / 60_000).max(0)
}
