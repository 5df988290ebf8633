use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, ConditionalFormatDataBar, Format,
    Workbook, Worksheet, XlsxError,
};

use crate::core::{AppError, Result};
use crate::modules::reports::models::{Cell, ColumnRole, LabeledTable};
use crate::modules::reports::services::formatter::FormattedReport;

const POSITIVE_FONT: u32 = 0x006100;
const NEGATIVE_FONT: u32 = 0x9C0006;
const DATA_BAR_FILL: u32 = 0x00FF00;

/// Write the report as a two-sheet workbook (`Day`, `Month`) and return
/// the serialized bytes.
///
/// The day sheet gets a data bar over the totals, green/red font by the
/// sign of the percent-change column, and an autofilter over the
/// leading columns when a sub-type column is present.
pub fn write_workbook(report: &FormattedReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let day_sheet = workbook.add_worksheet();
    day_sheet.set_name("Day").map_err(xlsx_err)?;
    write_table(day_sheet, &report.day_table)?;
    apply_day_formats(day_sheet, &report.day_table)?;

    let month_sheet = workbook.add_worksheet();
    month_sheet.set_name("Month").map_err(xlsx_err)?;
    write_table(month_sheet, &report.month_table)?;

    workbook.save_to_buffer().map_err(xlsx_err)
}

fn write_table(sheet: &mut Worksheet, table: &LabeledTable) -> Result<()> {
    let header_format = Format::new().set_bold();

    for (col, column) in table.columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, column.header.as_str(), &header_format)
            .map_err(xlsx_err)?;
        let width = (column.header.len() as f64 * 1.1).max(12.0);
        sheet.set_column_width(col as u16, width).map_err(xlsx_err)?;
    }

    for (row_index, row) in table.rows.iter().enumerate() {
        let row_number = row_index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => sheet.write_string(row_number, col, text.as_str()),
                Cell::Float(value) => sheet.write_number(row_number, col, *value),
                Cell::Int(value) => sheet.write_number(row_number, col, *value as f64),
            }
            .map_err(xlsx_err)?;
        }
    }

    Ok(())
}

fn apply_day_formats(sheet: &mut Worksheet, table: &LabeledTable) -> Result<()> {
    if table.is_empty() {
        return Ok(());
    }
    let last_row = table.rows.len() as u32;

    if let Some(total_col) = table.column_index(ColumnRole::Total) {
        let total_col = total_col as u16;
        let data_bar = ConditionalFormatDataBar::new()
            .set_solid_fill(true)
            .set_fill_color(Color::RGB(DATA_BAR_FILL));
        sheet
            .add_conditional_format(1, total_col, last_row, total_col, &data_bar)
            .map_err(xlsx_err)?;
    }

    if let Some(pct_col) = table.column_index(ColumnRole::PctChange) {
        let pct_col = pct_col as u16;
        let positive = ConditionalFormatCell::new()
            .set_rule(ConditionalFormatCellRule::GreaterThan(0))
            .set_format(Format::new().set_font_color(Color::RGB(POSITIVE_FONT)));
        let negative = ConditionalFormatCell::new()
            .set_rule(ConditionalFormatCellRule::LessThan(0))
            .set_format(Format::new().set_font_color(Color::RGB(NEGATIVE_FONT)));
        sheet
            .add_conditional_format(1, pct_col, last_row, pct_col, &positive)
            .map_err(xlsx_err)?;
        sheet
            .add_conditional_format(1, pct_col, last_row, pct_col, &negative)
            .map_err(xlsx_err)?;
    }

    if table.column_index(ColumnRole::SubType).is_some() {
        sheet.autofilter(0, 0, last_row, 1).map_err(xlsx_err)?;
    }

    Ok(())
}

fn xlsx_err(e: XlsxError) -> AppError {
    AppError::export(format!("spreadsheet export failed: {}", e))
}
