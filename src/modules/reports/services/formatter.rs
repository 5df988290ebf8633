use std::collections::BTreeSet;

use crate::config::{ReportTypeConfig, Vocabulary};
use crate::modules::reports::models::{
    Cell, Column, ColumnRole, DayRollup, LabeledTable, Rollups, Summary,
};

/// One sub-population's slice of the report: a day table plus its
/// headline summary. Non-split types produce exactly one section.
#[derive(Debug, Clone)]
pub struct ReportSection {
    pub sub_type: Option<String>,
    pub day_table: LabeledTable,
    pub summary: Summary,
}

/// Display-ready report: the combined day table (spreadsheet layout),
/// the month table, and one section per sub-population (PDF layout)
#[derive(Debug, Clone)]
pub struct FormattedReport {
    pub day_table: LabeledTable,
    pub month_table: LabeledTable,
    pub sections: Vec<ReportSection>,
}

/// Apply the type's vocabulary and grouping policy to raw rollups.
/// `None` when there is nothing to report.
pub fn format_report(rollups: &Rollups, report_type: &ReportTypeConfig) -> Option<FormattedReport> {
    if rollups.is_empty() {
        return None;
    }

    let vocabulary = report_type.vocabulary;
    let has_nominal = report_type.fields.total_debit.is_some();
    let split = report_type.split_sub_types;

    let mut day_table = LabeledTable::new(day_columns(vocabulary, split, has_nominal));
    for day in &rollups.days {
        day_table.push_row(day_row(day, split, has_nominal));
    }

    let mut month_table = LabeledTable::new(month_columns(vocabulary, split, has_nominal));
    for month in &rollups.months {
        let mut row = vec![Cell::Text(month.month.clone())];
        if split {
            row.push(Cell::Text(month.sub_type.clone().unwrap_or_default()));
        }
        row.push(Cell::Float(month.total));
        if has_nominal {
            row.push(Cell::Int(month.nominal.unwrap_or(0.0).trunc() as i64));
        }
        month_table.push_row(row);
    }

    let sections = if split {
        let sub_types: BTreeSet<String> = rollups
            .days
            .iter()
            .filter_map(|day| day.sub_type.clone())
            .collect();
        sub_types
            .into_iter()
            .map(|sub_type| {
                let days = rollups.days_of(Some(sub_type.as_str()));
                let mut table = LabeledTable::new(day_columns(vocabulary, false, has_nominal));
                for day in &days {
                    table.push_row(day_row(day, false, has_nominal));
                }
                ReportSection {
                    sub_type: Some(sub_type),
                    summary: summarize(&days),
                    day_table: table,
                }
            })
            .collect()
    } else {
        let days: Vec<&DayRollup> = rollups.days.iter().collect();
        vec![ReportSection {
            sub_type: None,
            summary: summarize(&days),
            day_table: day_table.clone(),
        }]
    };

    Some(FormattedReport {
        day_table,
        month_table,
        sections,
    })
}

fn day_columns(vocabulary: Vocabulary, with_sub_type: bool, with_nominal: bool) -> Vec<Column> {
    let noun = vocabulary.noun();
    let rate = vocabulary.rate();

    let mut columns = vec![Column::new(format!("{} Date", noun), ColumnRole::Date)];
    if with_sub_type {
        columns.push(Column::new("Type", ColumnRole::SubType));
    }
    columns.push(Column::new(format!("Max {}", rate), ColumnRole::Max));
    columns.push(Column::new(format!("Avg {}", rate), ColumnRole::Avg));
    columns.push(Column::new(
        format!("Max {} (95th Percentile)", rate),
        ColumnRole::Percentile,
    ));
    columns.push(Column::new(
        format!("Total {} Per Day", noun),
        ColumnRole::Total,
    ));
    if with_nominal {
        columns.push(Column::new(
            format!("Nominal {} Per Day", noun),
            ColumnRole::Nominal,
        ));
    }
    columns.push(Column::new("Trx Pct Change", ColumnRole::PctChange));
    columns
}

fn month_columns(vocabulary: Vocabulary, with_sub_type: bool, with_nominal: bool) -> Vec<Column> {
    let noun = vocabulary.noun();

    let mut columns = vec![Column::new("Month", ColumnRole::Month)];
    if with_sub_type {
        columns.push(Column::new("Type", ColumnRole::SubType));
    }
    columns.push(Column::new(
        format!("Total {} Per Month", noun),
        ColumnRole::Total,
    ));
    if with_nominal {
        columns.push(Column::new(
            format!("Nominal {} Per Month", noun),
            ColumnRole::Nominal,
        ));
    }
    columns
}

fn day_row(day: &DayRollup, with_sub_type: bool, with_nominal: bool) -> Vec<Cell> {
    let mut row = vec![Cell::Text(day.date.format("%Y-%m-%d").to_string())];
    if with_sub_type {
        row.push(Cell::Text(day.sub_type.clone().unwrap_or_default()));
    }
    row.push(Cell::Float(day.max));
    row.push(Cell::Float(day.avg));
    row.push(Cell::Float(day.p95));
    row.push(Cell::Float(day.total));
    if with_nominal {
        // Nominal amounts are truncated, not rounded.
        row.push(Cell::Int(day.nominal.unwrap_or(0.0).trunc() as i64));
    }
    row.push(Cell::Float(day.pct_change));
    row
}

/// Headline statistics of one day-table: min/max percent change, counts
/// of strictly negative/positive change days, and the peak-total day.
/// Ties on the peak keep the earliest day.
fn summarize(days: &[&DayRollup]) -> Summary {
    let mut minimum = f64::MAX;
    let mut maximum = f64::MIN;
    let mut negative_days = 0;
    let mut positive_days = 0;
    let mut peak: Option<&DayRollup> = None;

    for day in days {
        minimum = minimum.min(day.pct_change);
        maximum = maximum.max(day.pct_change);
        if day.pct_change < 0.0 {
            negative_days += 1;
        } else if day.pct_change > 0.0 {
            positive_days += 1;
        }
        if peak.map_or(true, |best| day.total > best.total) {
            peak = Some(day);
        }
    }

    let (max_total_trx, trx_date) = peak
        .map(|day| (day.total, day.date.format("%Y-%m-%d").to_string()))
        .unwrap_or((0.0, String::new()));

    Summary {
        minimum: if minimum == f64::MAX { 0.0 } else { minimum },
        maximum: if maximum == f64::MIN { 0.0 } else { maximum },
        negative_days,
        positive_days,
        max_total_display: format_thousands(max_total_trx),
        max_total_trx,
        trx_date,
    }
}

/// Thousands-separated integer display with `.` as the grouping
/// character; the fractional part is truncated
pub fn format_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let mut n = value.abs().trunc() as u64;
    let mut groups = Vec::new();
    loop {
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
        if n == 0 {
            break;
        }
    }
    let mut out = groups
        .pop()
        .map(|head| head.trim_start_matches('0').to_string())
        .unwrap_or_default();
    if out.is_empty() {
        out = "0".to_string();
    }
    for group in groups.into_iter().rev() {
        out.push('.');
        out.push_str(&group);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
