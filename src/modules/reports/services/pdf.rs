use chrono::Utc;
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocumentReference,
    PdfLayerReference, Rgb,
};

use crate::config::{ReportTypeConfig, Vocabulary};
use crate::core::{timezone, AppError, Result};
use crate::modules::reports::models::{Cell, ColumnRole, LabeledTable, Rollups};
use crate::modules::reports::services::chart::{self, ChartImage, ChartMetric};
use crate::modules::reports::services::formatter::{format_thousands, FormattedReport, ReportSection};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 14.0;
const ROW_HEIGHT_MM: f64 = 6.0;

/// Assemble the PDF report: title page, per-sub-type day tables,
/// monthly-total table, comparison charts and the closing narrative.
pub fn write_document(
    report: &FormattedReport,
    rollups: &Rollups,
    previous: Option<&Rollups>,
    report_type: &ReportTypeConfig,
) -> Result<Vec<u8>> {
    let vocabulary = report_type.vocabulary;
    let noun = vocabulary.noun();
    let rate = vocabulary.rate();
    let split = report.sections.len() > 1;

    let mut builder = PdfBuilder::new("Monthly Report")?;
    builder.write_title("Monthly Report")?;

    // Day tables, one section per sub-population
    for (index, section) in report.sections.iter().enumerate() {
        if index > 0 {
            builder.new_page()?;
        }
        let heading = format!(
            "{}. The table below illustrates the monthly {}s of {}{}:",
            section_number("1", split, index),
            noun,
            report_type.name,
            section_suffix(section),
        );
        builder.write_paragraph(&heading, 12.0)?;
        builder.write_table(&section.day_table)?;
    }

    builder.new_page()?;
    builder.write_paragraph(
        &format!(
            "2. The table below illustrates total amount monthly {}s:",
            noun
        ),
        12.0,
    )?;
    builder.write_table(&report.month_table)?;

    // Comparison charts per section
    for (index, section) in report.sections.iter().enumerate() {
        builder.new_page()?;
        let heading = format!(
            "{}. The visualisations below show Max {} and Total {}{} per Day:",
            section_number("3", split, index),
            rate,
            noun,
            section_suffix(section),
        );
        builder.write_paragraph(&heading, 12.0)?;

        let sub_type = section.sub_type.as_deref();
        let current = rollups.days_of(sub_type);
        let overlay = previous.map(|p| p.days_of(sub_type)).unwrap_or_default();

        let max_chart =
            chart::render_day_chart(&current, &overlay, ChartMetric::Max, report_type)?;
        builder.embed_chart(&max_chart)?;
        let total_chart =
            chart::render_day_chart(&current, &overlay, ChartMetric::Total, report_type)?;
        builder.embed_chart(&total_chart)?;
    }

    builder.write_paragraph(&conclusion_text(vocabulary, &report.sections), 12.0)?;

    builder.finish()
}

fn section_number(base: &str, split: bool, index: usize) -> String {
    if split {
        format!("{}{}", base, (b'a' + index as u8) as char)
    } else {
        base.to_string()
    }
}

fn section_suffix(section: &ReportSection) -> String {
    section
        .sub_type
        .as_deref()
        .map(|sub_type| format!(" {}", sub_type))
        .unwrap_or_default()
}

/// Closing narrative templated from the per-section summaries; split
/// types get paired clauses, one per sub-population.
pub fn conclusion_text(vocabulary: Vocabulary, sections: &[ReportSection]) -> String {
    let noun = vocabulary.noun_lower();
    if sections.is_empty() {
        return "No summary data available".to_string();
    }

    if sections.len() == 1 {
        let summary = &sections[0].summary;
        return format!(
            "In conclusion, this month's {noun}s show a total decrease in {noun}s by {} \
             and an increase in {noun}s by {}. The lowest decrease was {:.2}%, while the \
             highest increase reached {:.2}%. The highest {noun} total occurred on {}, \
             with a value of {}.",
            summary.negative_days,
            summary.positive_days,
            summary.minimum,
            summary.maximum,
            summary.trx_date,
            summary.max_total_display,
        );
    }

    let label = |section: &ReportSection| {
        section
            .sub_type
            .clone()
            .unwrap_or_else(|| "overall".to_string())
    };

    let counts = sections
        .iter()
        .map(|section| {
            format!(
                "a total decrease in {noun}s by {} and an increase in {noun}s by {} for {}",
                section.summary.negative_days,
                section.summary.positive_days,
                label(section),
            )
        })
        .collect::<Vec<_>>()
        .join(", and ");

    let extremes = sections
        .iter()
        .map(|section| {
            format!(
                "The lowest decrease was {:.2}%, while the highest increase reached {:.2}% for {}.",
                section.summary.minimum,
                section.summary.maximum,
                label(section),
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    let peaks = sections
        .iter()
        .map(|section| {
            format!(
                "the highest {noun} total occurred on {} with a value of {} for {}",
                section.summary.trx_date,
                section.summary.max_total_display,
                label(section),
            )
        })
        .collect::<Vec<_>>()
        .join(", and ");

    format!(
        "In conclusion, this month's {noun}s show {counts}. {extremes} Finally, {peaks}."
    )
}

struct PdfBuilder {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    cursor_y: f64,
    page_count: u32,
}

impl PdfBuilder {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = printpdf::PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM as f32),
            Mm(PAGE_HEIGHT_MM as f32),
            "Layer 1",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;
        let italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(pdf_err)?;

        let layer = doc.get_page(page).get_layer(layer);
        let mut builder = Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            cursor_y: PAGE_HEIGHT_MM - MARGIN_MM - 10.0,
            page_count: 1,
        };
        builder.write_footer();
        Ok(builder)
    }

    fn new_page(&mut self) -> Result<()> {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor_y = PAGE_HEIGHT_MM - MARGIN_MM - 10.0;
        self.page_count += 1;
        self.write_footer();
        Ok(())
    }

    fn write_footer(&mut self) {
        self.set_color(0.5, 0.5, 0.5);
        self.layer.use_text(
            format!("Page {}", self.page_count),
            8.0,
            Mm(PAGE_WIDTH_MM as f32 / 2.0 - 5.0),
            Mm(8.0),
            &self.italic,
        );
        self.set_color(0.0, 0.0, 0.0);
    }

    fn set_color(&self, r: f64, g: f64, b: f64) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r as f32, g as f32, b as f32, None)));
    }

    fn ensure_space(&mut self, needed_mm: f64) -> Result<()> {
        if self.cursor_y - needed_mm < MARGIN_MM + 6.0 {
            self.new_page()?;
        }
        Ok(())
    }

    fn write_title(&mut self, title: &str) -> Result<()> {
        self.layer
            .use_text(title, 20.0, Mm(MARGIN_MM as f32), Mm(self.cursor_y as f32), &self.bold);
        self.cursor_y -= 12.0;

        let today = Utc::now()
            .with_timezone(&timezone::report_offset())
            .format("%d/%m/%Y")
            .to_string();
        self.set_color(0.5, 0.5, 0.5);
        self.layer
            .use_text(today, 14.0, Mm(MARGIN_MM as f32), Mm(self.cursor_y as f32), &self.regular);
        self.set_color(0.0, 0.0, 0.0);
        self.cursor_y -= 14.0;
        Ok(())
    }

    fn write_paragraph(&mut self, text: &str, size: f64) -> Result<()> {
        let line_height = size * 0.3528 * 1.45;
        let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let max_chars = (usable_mm / (size * 0.48 * 0.3528)).max(20.0) as usize;

        for line in wrap_text(text, max_chars) {
            self.ensure_space(line_height)?;
            self.layer
                .use_text(line, size as f32, Mm(MARGIN_MM as f32), Mm(self.cursor_y as f32), &self.regular);
            self.cursor_y -= line_height;
        }
        self.cursor_y -= 4.0;
        Ok(())
    }

    fn write_table(&mut self, table: &LabeledTable) -> Result<()> {
        let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let column_width = usable_mm / table.columns.len() as f64;
        let pct_column = table.column_index(ColumnRole::PctChange);

        self.ensure_space(ROW_HEIGHT_MM)?;
        for (col, column) in table.columns.iter().enumerate() {
            self.layer.use_text(
                column.header.clone(),
                8.0,
                Mm((MARGIN_MM + col as f64 * column_width) as f32),
                Mm(self.cursor_y as f32),
                &self.bold,
            );
        }
        self.cursor_y -= ROW_HEIGHT_MM;

        for row in &table.rows {
            self.ensure_space(ROW_HEIGHT_MM)?;
            for (col, cell) in row.iter().enumerate() {
                let role = table.columns[col].role;
                if pct_column == Some(col) {
                    if let Some(value) = cell.as_f64() {
                        if value < 0.0 {
                            self.set_color(0.8, 0.0, 0.0);
                        } else if value > 0.0 {
                            self.set_color(0.0, 0.5, 0.0);
                        }
                    }
                }
                self.layer.use_text(
                    display_cell(cell, role),
                    8.0,
                    Mm((MARGIN_MM + col as f64 * column_width) as f32),
                    Mm(self.cursor_y as f32),
                    &self.regular,
                );
                if pct_column == Some(col) {
                    self.set_color(0.0, 0.0, 0.0);
                }
            }
            self.cursor_y -= ROW_HEIGHT_MM;
        }
        self.cursor_y -= 4.0;
        Ok(())
    }

    fn embed_chart(&mut self, chart: &ChartImage) -> Result<()> {
        let image = RgbImage::from_raw(chart.width, chart.height, chart.pixels.clone())
            .ok_or_else(|| AppError::export("chart buffer has unexpected size"))?;
        let pdf_image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(image));

        let target_width_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let dpi = chart.width as f64 * 25.4 / target_width_mm;
        let height_mm = chart.height as f64 * 25.4 / dpi;

        self.ensure_space(height_mm + 6.0)?;
        pdf_image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM as f32)),
                translate_y: Some(Mm((self.cursor_y - height_mm) as f32)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
        self.cursor_y -= height_mm + 6.0;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_err)
    }
}

fn display_cell(cell: &Cell, role: ColumnRole) -> String {
    match (cell, role) {
        (Cell::Text(text), _) => text.clone(),
        (cell, ColumnRole::Total) | (cell, ColumnRole::Nominal) => {
            format_thousands(cell.as_f64().unwrap_or(0.0))
        }
        (cell, ColumnRole::PctChange) => format!("{:.2}%", cell.as_f64().unwrap_or(0.0)),
        (Cell::Float(value), _) => format!("{:.0}", value),
        (Cell::Int(value), _) => value.to_string(),
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn pdf_err(e: printpdf::Error) -> AppError {
    AppError::export(format!("pdf export failed: {}", e))
}
