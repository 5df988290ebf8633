use plotters::chart::DualCoordChartContext;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::config::ReportTypeConfig;
use crate::core::{AppError, Result};
use crate::modules::reports::models::DayRollup;

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 520;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const BAR_YELLOW: RGBColor = RGBColor(240, 200, 8);

/// Which statistic a comparison chart plots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMetric {
    /// Max bars with avg and 95th-percentile bars alongside
    Max,
    /// Single total-per-day bars
    Total,
}

/// Raw RGB chart image
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Render a grouped bar chart of the current month's day rollup, capped
/// at the type's chart row limit, with the peak bar annotated.
///
/// A non-empty previous month overlays as a line series on a secondary
/// labeled axis, aligned by ordinal position (day 1 with day 1).
pub fn render_day_chart(
    current: &[&DayRollup],
    previous: &[&DayRollup],
    metric: ChartMetric,
    report_type: &ReportTypeConfig,
) -> Result<ChartImage> {
    if current.is_empty() {
        return Err(AppError::export("cannot chart an empty rollup"));
    }

    let vocabulary = report_type.vocabulary;
    let rate = vocabulary.rate();
    let cap = report_type.chart_days;
    let rows = &current[..current.len().min(cap)];
    let overlay = &previous[..previous.len().min(cap)];

    let metric_value = |day: &DayRollup| match metric {
        ChartMetric::Max => day.max,
        ChartMetric::Total => day.total,
    };

    let title = match metric {
        ChartMetric::Max => format!("{} per Day", rate),
        ChartMetric::Total => format!("Total {} Per Day", vocabulary.noun()),
    };

    let mut y_max = 1.0_f64;
    for day in rows {
        y_max = y_max.max(metric_value(day));
        if metric == ChartMetric::Max {
            y_max = y_max.max(day.avg).max(day.p95);
        }
    }
    for day in overlay {
        y_max = y_max.max(metric_value(day));
    }
    y_max *= 1.2;

    let x_max = rows.len().max(overlay.len()) as f64;
    let dates: Vec<String> = rows
        .iter()
        .map(|day| day.date.format("%m-%d").to_string())
        .collect();

    let mut pixels = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut pixels, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(16)
            .caption(&title, ("sans-serif", 24))
            .x_label_area_size(56)
            .y_label_area_size(64)
            .right_y_label_area_size(56)
            .build_cartesian_2d(0.0..x_max, 0.0..y_max)
            .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?
            .set_secondary_coord(0.0..x_max, 0.0..y_max);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len().min(20))
            .x_label_formatter(&|x: &f64| {
                let index = x.floor() as usize;
                if (x - index as f64).abs() < 0.5 && index < dates.len() {
                    dates[index].clone()
                } else {
                    String::new()
                }
            })
            .x_desc(format!("{} Date", vocabulary.noun()))
            .y_desc(title.clone())
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?;

        match metric {
            ChartMetric::Max => {
                draw_bars(&mut chart, rows, |d| d.max, -0.3, 0.2, SKY_BLUE, &format!("Max {}", rate))?;
                draw_bars(&mut chart, rows, |d| d.avg, -0.1, 0.2, BAR_YELLOW, &format!("Avg {}", rate))?;
                draw_bars(
                    &mut chart,
                    rows,
                    |d| d.p95,
                    0.1,
                    0.2,
                    RED,
                    &format!("Max {} (95th Percentile)", rate),
                )?;
            }
            ChartMetric::Total => {
                draw_bars(&mut chart, rows, |d| d.total, -0.2, 0.4, SKY_BLUE, &title)?;
            }
        }

        if !overlay.is_empty() {
            chart
                .draw_secondary_series(LineSeries::new(
                    overlay
                        .iter()
                        .enumerate()
                        .map(|(i, day)| (i as f64 + 0.5, metric_value(day))),
                    &BLACK,
                ))
                .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?
                .label("Last Month")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], BLACK));

            chart
                .configure_secondary_axes()
                .y_desc("Last Month")
                .draw()
                .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?;
        }

        // Peak annotation
        let (peak_index, peak_value) = rows
            .iter()
            .enumerate()
            .map(|(i, day)| (i, metric_value(day)))
            .fold((0, f64::MIN), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });
        chart
            .draw_series(std::iter::once(Text::new(
                format!("{:.0}", peak_value),
                (peak_index as f64 + 0.5, peak_value + y_max * 0.02),
                ("sans-serif", 15),
            )))
            .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?;

        root.present()
            .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?;
    }

    Ok(ChartImage {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        pixels,
    })
}

fn draw_bars<DB>(
    chart: &mut DualCoordChartContext<
        '_,
        DB,
        Cartesian2d<RangedCoordf64, RangedCoordf64>,
        Cartesian2d<RangedCoordf64, RangedCoordf64>,
    >,
    rows: &[&DayRollup],
    value: impl Fn(&DayRollup) -> f64,
    offset: f64,
    width: f64,
    color: RGBColor,
    label: &str,
) -> Result<()>
where
    DB: DrawingBackend,
{
    chart
        .draw_series(rows.iter().enumerate().map(|(i, day)| {
            let center = i as f64 + 0.5;
            Rectangle::new(
                [
                    (center + offset, 0.0),
                    (center + offset + width, value(day)),
                ],
                color.filled(),
            )
        }))
        .map_err(|e| AppError::export(format!("chart rendering failed: {}", e)))?
        .label(label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    Ok(())
}
