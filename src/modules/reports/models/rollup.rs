use chrono::NaiveDate;
use serde::Serialize;

/// Day-level statistics for one (calendar day, sub-type) bucket.
///
/// `pct_change` is relative to the chronologically previous row of the
/// same sub-type group; the first row of each group is 0.
#[derive(Debug, Clone, Serialize)]
pub struct DayRollup {
    pub date: NaiveDate,
    pub sub_type: Option<String>,
    /// Maximum of the type's `max` field
    pub max: f64,
    /// Mean of the type's `avg` field
    pub avg: f64,
    /// 95th percentile (linear interpolation) of the `max` field
    pub p95: f64,
    /// Sum of the type's `total` field
    pub total: f64,
    /// Sum of the `total_debit` field for types reporting nominal amounts
    pub nominal: Option<f64>,
    pub pct_change: f64,
}

/// Month-level totals for one (calendar month, sub-type) bucket
#[derive(Debug, Clone, Serialize)]
pub struct MonthRollup {
    /// Calendar-month key, `YYYY-MM`
    pub month: String,
    pub sub_type: Option<String>,
    pub total: f64,
    pub nominal: Option<f64>,
}

/// Full aggregation result for one report request.
///
/// Rollups live only for the duration of one report-generation call;
/// nothing is carried over between requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Rollups {
    pub days: Vec<DayRollup>,
    pub months: Vec<MonthRollup>,
}

impl Rollups {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Day rows of one sub-population, in chronological order
    pub fn days_of(&self, sub_type: Option<&str>) -> Vec<&DayRollup> {
        self.days
            .iter()
            .filter(|day| day.sub_type.as_deref() == sub_type)
            .collect()
    }
}
