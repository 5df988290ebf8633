use serde::Serialize;

/// Headline statistics derived from one day-rollup table
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Minimum of the percent-change column
    pub minimum: f64,
    /// Maximum of the percent-change column
    pub maximum: f64,
    /// Days with strictly negative percent change
    pub negative_days: usize,
    /// Days with strictly positive percent change
    pub positive_days: usize,
    /// Total of the peak day
    pub max_total_trx: f64,
    /// Peak-day total, thousands-separated for display
    pub max_total_display: String,
    /// Date (`YYYY-MM-DD`) of the peak day
    pub trx_date: String,
}
