use chrono::{DateTime, FixedOffset};

use crate::core::timezone;
use crate::core::Result;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Closed reporting window in the fixed reporting timezone; drives both
/// the search range filter and the calendar bucketing
#[derive(Debug, Clone, Copy)]
pub struct ReportWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl ReportWindow {
    /// Window spanning one calendar month, first day 00:00:00 through
    /// last day 23:59:59
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let (start, end) = timezone::month_window(year, month)?;
        Ok(Self { start, end })
    }

    /// Lower range-filter bound, RFC 3339
    pub fn start_param(&self) -> String {
        self.start.to_rfc3339()
    }

    /// Upper range-filter bound, RFC 3339
    pub fn end_param(&self) -> String {
        self.end.to_rfc3339()
    }
}

/// User selection driving one report generation
#[derive(Debug, Clone)]
pub struct ReportSelection {
    pub type_name: String,
    pub month: u32,
    pub year: i32,
}

impl ReportSelection {
    /// English month name used in artifact file names
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("Unknown")
    }
}
