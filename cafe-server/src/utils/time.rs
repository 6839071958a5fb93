//! Business-timezone date helpers
//!
//! Dates travel as `YYYY-MM-DD`, months as `YYYY-MM`, times of day as
//! `HH:MM`. Conversion to Unix millis happens here so repositories only
//! see `i64`.

use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse `YYYY-MM-DD`
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse `YYYY-MM` into the first and last day of that month
pub fn parse_month(month: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::validation(format!("Invalid month format (YYYY-MM): {}", month));
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| invalid())?;
    if month.len() != 7 {
        return Err(invalid());
    }
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next.and_then(|d| d.pred_opt()).ok_or_else(invalid)?;
    Ok((first, last))
}

/// Parse `HH:MM`
pub fn parse_hhmm(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format (HH:MM): {}", value)))
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Local date of a Unix millis timestamp in the business timezone
pub fn local_date_of(millis: i64, tz: Tz) -> NaiveDate {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|| today(tz))
}

/// Local time of day of a Unix millis timestamp in the business timezone
pub fn local_time_of(millis: i64, tz: Tz) -> NaiveTime {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.time())
        .unwrap_or(NaiveTime::MIN)
}

/// Date + time of day → Unix millis (business timezone)
///
/// A local time inside a DST gap falls back to UTC.
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of day (00:00) → Unix millis
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_time_to_millis(date, NaiveTime::MIN, tz)
}

/// Start of the next day → Unix millis; callers use `< end`
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_time_to_millis(next_day, NaiveTime::MIN, tz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_bounds() {
        let (first, last) = parse_month("2024-02").unwrap();
        assert_eq!(format_date(first), "2024-02-01");
        assert_eq!(format_date(last), "2024-02-29");

        let (_, last) = parse_month("2023-12").unwrap();
        assert_eq!(format_date(last), "2023-12-31");

        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-1").is_err());
        assert!(parse_month("junk").is_err());
    }

    #[test]
    fn test_jakarta_day_window() {
        let tz = chrono_tz::Asia::Jakarta;
        let date = parse_date("2024-05-01").unwrap();
        let start = day_start_millis(date, tz);
        let end = day_end_millis(date, tz);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
        // 2024-05-01T00:00+07:00 == 2024-04-30T17:00Z
        assert_eq!(start, 1_714_496_400_000);
        assert_eq!(local_date_of(start, tz), date);
        assert_eq!(local_date_of(end - 1, tz), date);
    }

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(
            parse_hhmm("08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(parse_hhmm("8.30").is_err());
    }
}
