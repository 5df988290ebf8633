use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::ReportTypeConfig;
use crate::core::timezone;
use crate::modules::reports::models::{DayRollup, MonthRollup, Rollups};
use crate::modules::search::Record;

#[derive(Debug, Default)]
struct DayAccumulator {
    max_values: Vec<f64>,
    avg_sum: f64,
    avg_count: usize,
    total: f64,
    nominal: f64,
}

#[derive(Debug, Default)]
struct MonthAccumulator {
    total: f64,
    nominal: f64,
}

/// Roll a flat record list up into day-level and month-level statistics.
///
/// Each record lands in exactly one bucket, keyed by its timestamp
/// converted to the reporting timezone and truncated to a date. Grouping
/// is by plain calendar key, or by calendar key plus sub-type tag for
/// types with split reporting. Day rows come back sorted by date (then
/// sub-type) with percent change already applied per sub-type group.
pub fn aggregate(records: &[Record], report_type: &ReportTypeConfig) -> Rollups {
    let mapping = &report_type.fields;
    let sub_type_field = report_type
        .split_sub_types
        .then(|| mapping.sub_type.as_deref())
        .flatten();

    let mut day_groups: BTreeMap<(NaiveDate, Option<String>), DayAccumulator> = BTreeMap::new();
    let mut month_groups: BTreeMap<(String, Option<String>), MonthAccumulator> = BTreeMap::new();

    for record in records {
        let date = timezone::report_date(record.timestamp);
        let sub_type = match sub_type_field {
            Some(field) => match record.text(field) {
                Some(tag) => Some(tag.to_string()),
                None => {
                    // Cannot be attributed to a sub-population.
                    warn!(record_id = %record.id, "record skipped: missing sub-type tag");
                    continue;
                }
            },
            None => None,
        };

        let day = day_groups.entry((date, sub_type.clone())).or_default();
        if let Some(value) = record.number(&mapping.max) {
            day.max_values.push(value);
        }
        if let Some(value) = record.number(&mapping.avg) {
            day.avg_sum += value;
            day.avg_count += 1;
        }
        if let Some(value) = record.number(&mapping.total) {
            day.total += value;
        }
        if let Some(debit_field) = &mapping.total_debit {
            if let Some(value) = record.number(debit_field) {
                day.nominal += value;
            }
        }

        let month = month_groups
            .entry((timezone::month_key(date), sub_type))
            .or_default();
        if let Some(value) = record.number(&mapping.total) {
            month.total += value;
        }
        if let Some(debit_field) = &mapping.total_debit {
            if let Some(value) = record.number(debit_field) {
                month.nominal += value;
            }
        }
    }

    let has_nominal = mapping.total_debit.is_some();

    // BTreeMap iteration already yields date-ascending order.
    let mut days: Vec<DayRollup> = day_groups
        .into_iter()
        .map(|((date, sub_type), acc)| {
            let mut max_values = acc.max_values;
            let max = max_values.iter().copied().fold(0.0_f64, f64::max);
            let avg = if acc.avg_count > 0 {
                acc.avg_sum / acc.avg_count as f64
            } else {
                0.0
            };
            let p95 = percentile(&mut max_values, 0.95);
            DayRollup {
                date,
                sub_type,
                max,
                avg,
                p95,
                total: acc.total,
                nominal: has_nominal.then_some(acc.nominal),
                pct_change: 0.0,
            }
        })
        .collect();

    apply_pct_change(&mut days);

    let months: Vec<MonthRollup> = month_groups
        .into_iter()
        .map(|((month, sub_type), acc)| MonthRollup {
            month,
            sub_type,
            total: acc.total,
            nominal: has_nominal.then_some(acc.nominal),
        })
        .collect();

    debug!(
        records = records.len(),
        day_rows = days.len(),
        month_rows = months.len(),
        report_type = %report_type.name,
        "aggregation complete"
    );

    Rollups { days, months }
}

/// Percent change of each row's total against the previous row of the
/// same sub-type group. The first row of each group stays 0; a previous
/// total of zero has no defined change and also yields 0.
fn apply_pct_change(days: &mut [DayRollup]) {
    let mut previous_totals: HashMap<Option<String>, f64> = HashMap::new();
    for day in days.iter_mut() {
        if let Some(previous) = previous_totals.get(&day.sub_type) {
            if *previous != 0.0 {
                day.pct_change = (day.total - previous) / previous * 100.0;
            }
        }
        previous_totals.insert(day.sub_type.clone(), day.total);
    }
}

/// Percentile with linear interpolation between ranks.
/// Sorts the slice in place; an empty slice yields 0.
fn percentile(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let rank = q * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        values[lower] + (values[upper] - values[lower]) * (rank - lower as f64)
    }
}
