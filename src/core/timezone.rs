use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

use crate::core::{AppError, Result};

/// Reporting timezone handling.
/// Timestamps arrive from the search backend with arbitrary offsets and are
/// normalized to Western Indonesia Time (UTC+7) before calendar bucketing.
pub const REPORT_OFFSET_HOURS: i32 = 7;

/// The fixed UTC+7 reporting offset
pub fn report_offset() -> FixedOffset {
    FixedOffset::east_opt(REPORT_OFFSET_HOURS * 3600).expect("valid offset")
}

/// Calendar day of a timestamp in the reporting timezone
pub fn report_date(timestamp: DateTime<FixedOffset>) -> NaiveDate {
    timestamp.with_timezone(&report_offset()).date_naive()
}

/// Calendar-month key (`YYYY-MM`) for a reporting-timezone date
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Number of days in a calendar month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Bounds of a calendar month in the reporting timezone:
/// first day 00:00:00 through last day 23:59:59
pub fn month_window(year: i32, month: u32) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let days = days_in_month(year, month)
        .ok_or_else(|| AppError::validation(format!("invalid month: {}-{}", year, month)))?;
    let offset = report_offset();

    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .ok_or_else(|| AppError::validation(format!("invalid month: {}-{}", year, month)))?;
    let end = NaiveDate::from_ymd_opt(year, month, days)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .ok_or_else(|| AppError::validation(format!("invalid month: {}-{}", year, month)))?;

    Ok((start, end))
}

/// The calendar month immediately before the given one
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
