use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::Result;
use crate::report::{
    Cell, DashboardSheet, Fill, LineKind, ReportLayout, TableSheet, DASHBOARD_WIDTHS,
};

const HEADER_COLOR: u32 = 0x4472C4;
const DASHBOARD_TITLE_COLOR: u32 = 0x2F5496;
const DASHBOARD_SECTION_COLOR: u32 = 0xD6DCE5;
const WHITE: u32 = 0xFFFFFF;

const LABEL_COL: u16 = 1;
const VALUE_COL: u16 = 2;

struct Formats {
    header: Format,
    title: Format,
    section: Format,
    label: Format,
    label_bold: Format,
    value: Format,
}

impl Formats {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_color(WHITE)
            .set_background_color(HEADER_COLOR)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        let title = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_font_color(WHITE)
            .set_background_color(DASHBOARD_TITLE_COLOR)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        let section = Format::new()
            .set_bold()
            .set_background_color(DASHBOARD_SECTION_COLOR)
            .set_border(FormatBorder::Thin);

        let label = Format::new().set_border(FormatBorder::Thin);
        let label_bold = Format::new().set_bold().set_border(FormatBorder::Thin);
        let value = Format::new().set_border(FormatBorder::Thin);

        Self {
            header,
            title,
            section,
            label,
            label_bold,
            value,
        }
    }

    fn row(fill: Fill) -> Format {
        Format::new()
            .set_background_color(fill.rgb())
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::Top)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
    }

    fn metric_label(&self, bold: bool, fill: Option<Fill>) -> Format {
        let base = if bold { &self.label_bold } else { &self.label };
        match fill {
            Some(fill) => base.clone().set_background_color(fill.rgb()),
            None => base.clone(),
        }
    }
}

/// Encodes the report views into an xlsx document, sheets in layout order.
pub fn write_workbook(layout: &ReportLayout) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    for table in layout.tables() {
        let sheet = workbook.add_worksheet();
        write_table(sheet, table, &formats)?;
    }

    let sheet = workbook.add_worksheet();
    write_dashboard(sheet, &layout.dashboard, &formats)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell, format: &Format) -> Result<()> {
    match cell {
        Cell::Text(text) => {
            sheet.write_string_with_format(row, col, text, format)?;
        }
        Cell::Number(number) => {
            sheet.write_number_with_format(row, col, *number as f64, format)?;
        }
    }
    Ok(())
}

fn write_table(sheet: &mut Worksheet, table: &TableSheet, formats: &Formats) -> Result<()> {
    sheet.set_name(table.name)?;

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &formats.header)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let format = Formats::row(row.fill);
        let sheet_row = idx as u32 + 1;
        for (col, cell) in row.cells.iter().enumerate() {
            write_cell(sheet, sheet_row, col as u16, cell, &format)?;
        }
    }

    for (col, width) in table.column_widths().into_iter().enumerate() {
        sheet.set_column_width(col as u16, width as f64)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    Ok(())
}

fn write_dashboard(sheet: &mut Worksheet, dashboard: &DashboardSheet, formats: &Formats) -> Result<()> {
    sheet.set_name(dashboard.name)?;

    for (col, width) in DASHBOARD_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    for row in dashboard.first_row()..=dashboard.last_row() {
        match dashboard.line(row) {
            Some(LineKind::Title(text)) => {
                sheet.merge_range(row, LABEL_COL, row, VALUE_COL, text, &formats.title)?;
            }
            Some(LineKind::Section(text)) => {
                sheet.merge_range(row, LABEL_COL, row, VALUE_COL, text, &formats.section)?;
            }
            Some(LineKind::Metric {
                label,
                value,
                bold,
                fill,
            }) => {
                let label_format = formats.metric_label(*bold, *fill);
                sheet.write_string_with_format(row, LABEL_COL, label, &label_format)?;
                write_cell(sheet, row, VALUE_COL, value, &formats.value)?;
            }
            None => {
                sheet.write_blank(row, LABEL_COL, &formats.label)?;
                sheet.write_blank(row, VALUE_COL, &formats.value)?;
            }
        }
    }

    Ok(())
}
